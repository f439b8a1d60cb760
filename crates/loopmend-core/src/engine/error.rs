//! Defines the primary error type for all pipeline engine operations.
//!
//! This module provides the [`EngineError`] enum, which consolidates every
//! failure mode that can occur while detecting, modeling, merging, or
//! renumbering. Recoverable conditions (a failed modeling attempt, an
//! unavailable capability) are modeled as data elsewhere; `EngineError` is
//! reserved for conditions a caller must handle explicitly.

use crate::core::models::sequence::SequenceError;
use thiserror::Error;

/// The primary error type for pipeline engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Occurs when a stage requires a conformational-search capability and
    /// none is configured, or the configured one reports itself unusable.
    #[error("Conformational search is unavailable: {reason}")]
    CapabilityUnavailable {
        /// Why the capability cannot be used.
        reason: String,
    },

    /// Occurs when the attempt budget is spent without a single usable decoy.
    #[error("No viable decoy after {attempts} modeling attempts ({failures} failures)")]
    NoViableDecoy {
        /// The number of attempts that were made.
        attempts: usize,
        /// How many of those attempts failed outright.
        failures: usize,
    },

    /// Occurs when a repaired loop cannot be spliced back into the original
    /// structure without contradiction.
    #[error(
        "Cannot merge decoy from attempt {attempt} into chain {chain_id} at position {position}: {reason}"
    )]
    MergeConflict {
        /// The attempt index of the decoy being merged.
        attempt: usize,
        /// The chain in which the conflict occurred.
        chain_id: char,
        /// The reference position that could not be reconciled.
        position: isize,
        /// A description of the contradiction.
        reason: String,
    },

    /// Occurs when the reference sequence contradicts the structure it is
    /// supposed to describe.
    #[error("Reference sequence rejected for chain {chain_id}: {reason}")]
    InvalidReferenceSequence {
        /// The chain whose reference entry is unusable.
        chain_id: char,
        /// Why the entry was rejected.
        reason: String,
    },

    /// Occurs when an unexpected internal state or logic error is encountered.
    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl From<SequenceError> for EngineError {
    fn from(source: SequenceError) -> Self {
        let chain_id = match source {
            SequenceError::InvalidSymbol { chain_id, .. } => chain_id,
            SequenceError::EmptyChain { chain_id } => chain_id,
        };
        EngineError::InvalidReferenceSequence {
            chain_id,
            reason: source.to_string(),
        }
    }
}
