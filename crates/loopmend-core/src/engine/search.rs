//! Defines the injected capability interfaces the pipeline builds on.
//!
//! The repair engine never performs conformational sampling itself. Loop
//! closure, relaxation, and energy evaluation are delegated to an external
//! implementation of [`ConformationalSearch`], and knowledge-based rescoring
//! to an optional [`StatisticalPotential`]. Both are injected at the
//! workflow boundary through [`SearchCapabilities`]; absence of either is a
//! valid configuration, and the pipeline degrades gracefully rather than
//! refusing to run.

use super::gaps::Gap;
use crate::core::models::structure::Structure;
use thiserror::Error;

/// Errors reported by a conformational-search implementation.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The capability cannot operate at all (missing license, missing
    /// runtime, lost connection). Aborts the attempt loop.
    #[error("Search backend unavailable: {0}")]
    Unavailable(String),

    /// A single loop-closure call failed. Fails only the current attempt.
    #[error("Loop closure failed: {0}")]
    Closure(String),

    /// Whole-structure relaxation failed. Fails only the current attempt.
    #[error("Relaxation failed: {0}")]
    Relaxation(String),

    /// Energy evaluation failed. Fails only the current attempt.
    #[error("Energy evaluation failed: {0}")]
    Energy(String),
}

/// Error reported by a statistical-potential implementation.
///
/// Failure here never discards a decoy; the decoy is kept with its physical
/// energy alone.
#[derive(Debug, Error)]
#[error("Statistical potential evaluation failed: {0}")]
pub struct PotentialError(pub String);

/// A conformational-search capability able to rebuild and refine loops.
///
/// Implementations are expected to be stochastic: repeated calls with the
/// same inputs should explore different conformations, which is what makes
/// the bounded attempt loop worthwhile.
pub trait ConformationalSearch: Sync {
    /// Builds coordinates for the missing residues of `gap` on top of
    /// `structure`, returning a new structure containing the closed loop.
    fn close_loop(&self, structure: &Structure, gap: &Gap) -> Result<Structure, SearchError>;

    /// Relaxes the whole structure after all gaps have been closed.
    fn relax(&self, structure: &Structure) -> Result<Structure, SearchError>;

    /// Evaluates the physical energy of a relaxed structure. Lower is better.
    fn energy(&self, structure: &Structure) -> Result<f64, SearchError>;
}

/// A knowledge-based potential used to rescore relaxed decoys.
pub trait StatisticalPotential: Sync {
    /// Scores a relaxed structure. Lower is better; multi-chain structures
    /// report the average over their chains.
    fn score(&self, structure: &Structure) -> Result<f64, PotentialError>;
}

/// The set of capabilities injected into a repair run.
#[derive(Default, Clone, Copy)]
pub struct SearchCapabilities<'a> {
    /// The conformational-search engine, if one is configured.
    pub search: Option<&'a dyn ConformationalSearch>,
    /// The statistical potential used for rescoring, if one is configured.
    pub potential: Option<&'a dyn StatisticalPotential>,
}

impl<'a> SearchCapabilities<'a> {
    /// Creates an empty capability set.
    ///
    /// A pipeline run with no capabilities still detects and scores gaps; it
    /// reports that manual repair is required instead of generating decoys.
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a capability set with a search engine and no potential.
    pub fn with_search(search: &'a dyn ConformationalSearch) -> Self {
        Self {
            search: Some(search),
            potential: None,
        }
    }

    /// Adds a statistical potential to the capability set.
    pub fn and_potential(mut self, potential: &'a dyn StatisticalPotential) -> Self {
        self.potential = Some(potential);
        self
    }
}
