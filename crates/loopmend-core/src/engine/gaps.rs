//! Detects missing residues and numbering breaks against a reference sequence.
//!
//! This module is the pipeline's comparator. It aligns each modeled chain to
//! its reference entry purely through author-assigned residue numbers:
//! reference position `i` (1-based) corresponds to the residue numbered `i`,
//! and any position with no residue of that number is missing. Consecutive
//! missing positions collapse into a single [`Gap`] carrying the subsequence
//! to rebuild. Numbering that fails to increase between neighboring residues
//! is reported separately as a [`Discontinuity`]; a forward jump alone is
//! not a discontinuity, because the skipped positions are already accounted
//! for as a gap.

use super::error::EngineError;
use crate::core::models::residue::Residue;
use crate::core::models::sequence::ReferenceSequence;
use crate::core::models::structure::Structure;
use crate::core::utils::identifiers::UNKNOWN_RESIDUE_LETTER;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, instrument};

/// Where a run of missing residues sits within its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    /// The gap starts at reference position 1.
    NTerminal,
    /// The gap lies strictly between modeled residues.
    Internal,
    /// The gap ends at the last reference position.
    CTerminal,
}

impl fmt::Display for GapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GapKind::NTerminal => "N-terminal",
            GapKind::Internal => "internal",
            GapKind::CTerminal => "C-terminal",
        };
        write!(f, "{}", s)
    }
}

/// A maximal run of consecutive missing residues in one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gap {
    /// The chain the gap belongs to.
    pub chain_id: char,
    /// The first missing reference position (1-based, inclusive).
    pub start: isize,
    /// The last missing reference position (1-based, inclusive).
    pub end: isize,
    /// The one-letter reference subsequence covering the gap.
    pub sequence: String,
    /// The gap's placement within the chain.
    pub kind: GapKind,
}

impl Gap {
    /// Returns the number of missing residues the gap spans.
    pub fn residue_count(&self) -> usize {
        (self.end - self.start + 1) as usize
    }
}

/// An adjacent residue pair whose numbering fails to increase.
///
/// Covers backward jumps, repeated numbers, and insertion-code siblings. A
/// forward jump explained by a [`Gap`] is deliberately not reported here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discontinuity {
    /// The chain the break occurs in.
    pub chain_id: char,
    /// The number of the earlier residue in author order.
    pub before: isize,
    /// The number of the later residue in author order.
    pub after: isize,
}

/// The full outcome of comparing a structure against its reference.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GapReport {
    /// All gaps, ordered by chain then start position.
    pub gaps: Vec<Gap>,
    /// All numbering breaks, ordered by chain then position.
    pub discontinuities: Vec<Discontinuity>,
    /// Chains with modeled polymer residues but no reference entry.
    pub unmodeled_chains: Vec<char>,
}

impl GapReport {
    /// Returns `true` when no gaps and no discontinuities were found.
    pub fn is_clean(&self) -> bool {
        self.gaps.is_empty() && self.discontinuities.is_empty()
    }

    /// Returns the total number of missing residues across all gaps.
    pub fn missing_residue_count(&self) -> usize {
        self.gaps.iter().map(Gap::residue_count).sum()
    }
}

/// Compares a structure against its reference sequence.
///
/// Chains without a reference entry are recorded in
/// [`GapReport::unmodeled_chains`] and skipped; reference entries without a
/// matching chain are ignored. A residue number outside the reference range,
/// or a modeled residue whose identity contradicts the reference letter, is
/// a fatal [`EngineError::InvalidReferenceSequence`].
#[instrument(skip_all, fields(structure = %structure.id()))]
pub fn detect(
    structure: &Structure,
    reference: &ReferenceSequence,
) -> Result<GapReport, EngineError> {
    let mut report = GapReport::default();

    for (_, chain) in structure.chains_iter() {
        let polymer: Vec<&Residue> = chain
            .residues()
            .iter()
            .filter_map(|&residue_id| structure.residue(residue_id))
            .filter(|residue| residue.kind.is_polymer())
            .collect();

        if polymer.is_empty() {
            continue;
        }

        let Some(sequence) = reference.chain(chain.id) else {
            debug!(chain = %chain.id, "Chain has no reference entry; skipping analysis");
            report.unmodeled_chains.push(chain.id);
            continue;
        };
        let length = sequence.len() as isize;

        validate_chain(chain.id, &polymer, sequence, length)?;

        let present: HashSet<isize> = polymer.iter().map(|residue| residue.number).collect();
        collect_gaps(chain.id, length, &present, reference, &mut report)?;
        collect_discontinuities(chain.id, &polymer, &mut report);

        debug!(
            chain = %chain.id,
            modeled = polymer.len(),
            reference_length = length,
            "Analyzed chain against reference"
        );
    }

    report.gaps.sort_by_key(|gap| (gap.chain_id, gap.start));
    report
        .discontinuities
        .sort_by_key(|discontinuity| (discontinuity.chain_id, discontinuity.before));
    report.unmodeled_chains.sort_unstable();

    debug!(
        gaps = report.gaps.len(),
        discontinuities = report.discontinuities.len(),
        missing_residues = report.missing_residue_count(),
        "Gap detection finished"
    );
    Ok(report)
}

fn validate_chain(
    chain_id: char,
    polymer: &[&Residue],
    sequence: &str,
    length: isize,
) -> Result<(), EngineError> {
    for residue in polymer {
        if residue.number < 1 || residue.number > length {
            return Err(EngineError::InvalidReferenceSequence {
                chain_id,
                reason: format!(
                    "residue {} '{}' lies outside the reference range 1-{length}",
                    residue.number, residue.name
                ),
            });
        }
        let expected = sequence.as_bytes()[(residue.number - 1) as usize] as char;
        if expected == UNKNOWN_RESIDUE_LETTER {
            continue;
        }
        if let Some(observed) = residue.one_letter() {
            if observed != expected {
                return Err(EngineError::InvalidReferenceSequence {
                    chain_id,
                    reason: format!(
                        "residue {} is '{}' ({}) but the reference expects '{expected}'",
                        residue.number, observed, residue.name
                    ),
                });
            }
        }
    }
    Ok(())
}

fn collect_gaps(
    chain_id: char,
    length: isize,
    present: &HashSet<isize>,
    reference: &ReferenceSequence,
    report: &mut GapReport,
) -> Result<(), EngineError> {
    let mut missing_run: Option<(isize, isize)> = None;

    for position in 1..=length {
        if present.contains(&position) {
            if let Some((start, end)) = missing_run.take() {
                report
                    .gaps
                    .push(build_gap(chain_id, start, end, length, reference)?);
            }
        } else {
            missing_run = match missing_run {
                Some((start, _)) => Some((start, position)),
                None => Some((position, position)),
            };
        }
    }
    if let Some((start, end)) = missing_run {
        report
            .gaps
            .push(build_gap(chain_id, start, end, length, reference)?);
    }
    Ok(())
}

fn build_gap(
    chain_id: char,
    start: isize,
    end: isize,
    length: isize,
    reference: &ReferenceSequence,
) -> Result<Gap, EngineError> {
    let kind = if start == 1 {
        GapKind::NTerminal
    } else if end == length {
        GapKind::CTerminal
    } else {
        GapKind::Internal
    };
    let sequence = reference
        .subsequence(chain_id, start as usize, end as usize)
        .ok_or_else(|| {
            EngineError::Internal(format!(
                "validated gap {chain_id}:{start}-{end} has no reference subsequence"
            ))
        })?
        .to_string();

    Ok(Gap {
        chain_id,
        start,
        end,
        sequence,
        kind,
    })
}

fn collect_discontinuities(chain_id: char, polymer: &[&Residue], report: &mut GapReport) {
    for pair in polymer.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        if current.number <= previous.number {
            report.discontinuities.push(Discontinuity {
                chain_id,
                before: previous.number,
                after: current.number,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::ResidueKind;

    fn reference(chain_id: char, sequence: &str) -> ReferenceSequence {
        let mut reference = ReferenceSequence::new();
        reference.set_chain(chain_id, sequence).unwrap();
        reference
    }

    fn structure_with_residues(chain_id: char, entries: &[(isize, &str)]) -> Structure {
        let mut structure = Structure::new("TEST");
        let chain = structure.add_chain(chain_id);
        for &(number, name) in entries {
            structure
                .add_residue(chain, number, None, name, ResidueKind::Polymer)
                .unwrap();
        }
        structure
    }

    #[test]
    fn complete_chain_is_clean() {
        let structure = structure_with_residues(
            'A',
            &[(1, "MET"), (2, "LYS"), (3, "THR"), (4, "ALA"), (5, "TYR")],
        );
        let reference = reference('A', "MKTAY");

        let report = detect(&structure, &reference).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.missing_residue_count(), 0);
        assert!(report.unmodeled_chains.is_empty());
    }

    #[test]
    fn detects_internal_gap_with_sequence() {
        let structure = structure_with_residues('A', &[(1, "MET"), (2, "LYS"), (5, "TYR")]);
        let reference = reference('A', "MKTAY");

        let report = detect(&structure, &reference).unwrap();

        assert_eq!(report.gaps.len(), 1);
        let gap = &report.gaps[0];
        assert_eq!(gap.chain_id, 'A');
        assert_eq!(gap.start, 3);
        assert_eq!(gap.end, 4);
        assert_eq!(gap.sequence, "TA");
        assert_eq!(gap.kind, GapKind::Internal);
        assert_eq!(gap.residue_count(), 2);
        assert!(report.discontinuities.is_empty());
    }

    #[test]
    fn detects_terminal_gaps() {
        let structure = structure_with_residues('A', &[(2, "LYS"), (3, "THR")]);
        let reference = reference('A', "MKTAY");

        let report = detect(&structure, &reference).unwrap();

        assert_eq!(report.gaps.len(), 2);
        assert_eq!(report.gaps[0].kind, GapKind::NTerminal);
        assert_eq!(report.gaps[0].sequence, "M");
        assert_eq!(report.gaps[1].kind, GapKind::CTerminal);
        assert_eq!(report.gaps[1].sequence, "AY");
        assert_eq!(report.missing_residue_count(), 3);
    }

    #[test]
    fn forward_jump_over_gap_is_not_a_discontinuity() {
        let structure = structure_with_residues('A', &[(1, "MET"), (2, "LYS"), (5, "TYR")]);
        let reference = reference('A', "MKTAY");

        let report = detect(&structure, &reference).unwrap();

        assert_eq!(report.gaps.len(), 1);
        assert!(report.discontinuities.is_empty());
    }

    #[test]
    fn backward_jump_is_a_discontinuity() {
        let structure = structure_with_residues(
            'A',
            &[(1, "MET"), (2, "LYS"), (4, "ALA"), (3, "THR"), (5, "TYR")],
        );
        let reference = reference('A', "MKTAY");

        let report = detect(&structure, &reference).unwrap();

        assert!(report.gaps.is_empty());
        assert_eq!(report.discontinuities.len(), 1);
        assert_eq!(
            report.discontinuities[0],
            Discontinuity {
                chain_id: 'A',
                before: 4,
                after: 3
            }
        );
    }

    #[test]
    fn insertion_code_sibling_is_a_discontinuity() {
        let mut structure = Structure::new("TEST");
        let chain = structure.add_chain('A');
        structure
            .add_residue(chain, 1, None, "MET", ResidueKind::Polymer)
            .unwrap();
        structure
            .add_residue(chain, 2, None, "LYS", ResidueKind::Polymer)
            .unwrap();
        structure
            .add_residue(chain, 2, Some('A'), "LYS", ResidueKind::Polymer)
            .unwrap();
        structure
            .add_residue(chain, 3, None, "THR", ResidueKind::Polymer)
            .unwrap();
        let reference = reference('A', "MKT");

        let report = detect(&structure, &reference).unwrap();

        assert_eq!(report.discontinuities.len(), 1);
        assert_eq!(report.discontinuities[0].before, 2);
        assert_eq!(report.discontinuities[0].after, 2);
    }

    #[test]
    fn out_of_range_number_is_fatal() {
        let structure = structure_with_residues('A', &[(1, "MET"), (9, "TYR")]);
        let reference = reference('A', "MKTAY");

        let error = detect(&structure, &reference).unwrap_err();

        match error {
            EngineError::InvalidReferenceSequence { chain_id, reason } => {
                assert_eq!(chain_id, 'A');
                assert!(reason.contains('9'));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn identity_mismatch_is_fatal() {
        let structure = structure_with_residues('A', &[(1, "MET"), (2, "GLY")]);
        let reference = reference('A', "MKTAY");

        let error = detect(&structure, &reference).unwrap_err();

        assert!(matches!(
            error,
            EngineError::InvalidReferenceSequence { chain_id: 'A', .. }
        ));
    }

    #[test]
    fn unknown_reference_letter_matches_any_residue() {
        let structure = structure_with_residues('A', &[(1, "MET"), (2, "GLY")]);
        let reference = reference('A', "MX");

        let report = detect(&structure, &reference).unwrap();

        assert!(report.is_clean());
    }

    #[test]
    fn unknown_residue_name_matches_any_letter() {
        let structure = structure_with_residues('A', &[(1, "MET"), (2, "UNK")]);
        let reference = reference('A', "MK");

        let report = detect(&structure, &reference).unwrap();

        assert!(report.is_clean());
    }

    #[test]
    fn chain_without_reference_is_reported_not_fatal() {
        let mut structure = structure_with_residues('A', &[(1, "MET"), (2, "LYS")]);
        let chain_b = structure.add_chain('B');
        structure
            .add_residue(chain_b, 1, None, "GLY", ResidueKind::Polymer)
            .unwrap();
        let reference = reference('A', "MK");

        let report = detect(&structure, &reference).unwrap();

        assert!(report.gaps.is_empty());
        assert_eq!(report.unmodeled_chains, vec!['B']);
    }

    #[test]
    fn heteroatoms_are_ignored_by_alignment() {
        let mut structure = structure_with_residues('A', &[(1, "MET"), (2, "LYS")]);
        let chain = structure.find_chain_by_id('A').unwrap();
        structure
            .add_residue(chain, 401, None, "HOH", ResidueKind::Water)
            .unwrap();
        let reference = reference('A', "MK");

        let report = detect(&structure, &reference).unwrap();

        assert!(report.is_clean());
    }

    #[test]
    fn reference_only_chains_are_ignored() {
        let structure = structure_with_residues('A', &[(1, "MET"), (2, "LYS")]);
        let mut reference = ReferenceSequence::new();
        reference.set_chain('A', "MK").unwrap();
        reference.set_chain('Z', "GGG").unwrap();

        let report = detect(&structure, &reference).unwrap();

        assert!(report.is_clean());
        assert!(report.unmodeled_chains.is_empty());
    }
}
