//! Computes the 0-100 completeness score from a gap report.
//!
//! The score is a blunt instrument by intent: every missing residue costs
//! [`MISSING_RESIDUE_PENALTY`] and every numbering break costs
//! [`DISCONTINUITY_PENALTY`], subtracted from 100 and clamped at 0. A score
//! of 100 therefore means exactly "no gaps and no discontinuities", which is
//! what makes it usable as a before/after repair signal.

use super::gaps::GapReport;

/// Points deducted per missing residue.
pub const MISSING_RESIDUE_PENALTY: u32 = 1;

/// Points deducted per numbering discontinuity.
pub const DISCONTINUITY_PENALTY: u32 = 5;

/// A completeness assessment derived from one [`GapReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreReport {
    /// The clamped completeness score, 0 to 100.
    pub score: u8,
    /// The number of gaps found.
    pub gap_count: usize,
    /// The number of discontinuities found.
    pub discontinuity_count: usize,
    /// The total number of missing residues across all gaps.
    pub missing_residues: usize,
}

impl ScoreReport {
    /// Returns `true` when the score reflects a fully complete structure.
    pub fn is_complete(&self) -> bool {
        self.score == 100
    }
}

/// Scores a gap report.
pub fn score(report: &GapReport) -> ScoreReport {
    let missing_residues = report.missing_residue_count();
    let penalty = missing_residues as u32 * MISSING_RESIDUE_PENALTY
        + report.discontinuities.len() as u32 * DISCONTINUITY_PENALTY;

    ScoreReport {
        score: 100u32.saturating_sub(penalty) as u8,
        gap_count: report.gaps.len(),
        discontinuity_count: report.discontinuities.len(),
        missing_residues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::gaps::{Discontinuity, Gap, GapKind};

    fn gap(chain_id: char, start: isize, end: isize) -> Gap {
        Gap {
            chain_id,
            start,
            end,
            sequence: "A".repeat((end - start + 1) as usize),
            kind: GapKind::Internal,
        }
    }

    fn discontinuity(chain_id: char, before: isize, after: isize) -> Discontinuity {
        Discontinuity {
            chain_id,
            before,
            after,
        }
    }

    #[test]
    fn clean_report_scores_one_hundred() {
        let report = GapReport::default();

        let assessed = score(&report);

        assert_eq!(assessed.score, 100);
        assert!(assessed.is_complete());
    }

    #[test]
    fn each_missing_residue_costs_one_point() {
        let report = GapReport {
            gaps: vec![gap('A', 41, 60)],
            ..GapReport::default()
        };

        let assessed = score(&report);

        assert_eq!(assessed.score, 80);
        assert_eq!(assessed.gap_count, 1);
        assert_eq!(assessed.missing_residues, 20);
        assert!(!assessed.is_complete());
    }

    #[test]
    fn each_discontinuity_costs_five_points() {
        let report = GapReport {
            discontinuities: vec![discontinuity('A', 40, 35), discontinuity('B', 12, 12)],
            ..GapReport::default()
        };

        let assessed = score(&report);

        assert_eq!(assessed.score, 90);
        assert_eq!(assessed.discontinuity_count, 2);
    }

    #[test]
    fn penalties_combine_across_chains() {
        let report = GapReport {
            gaps: vec![gap('A', 1, 3), gap('B', 10, 11)],
            discontinuities: vec![discontinuity('A', 50, 49)],
            ..GapReport::default()
        };

        let assessed = score(&report);

        assert_eq!(assessed.score, 90);
    }

    #[test]
    fn score_saturates_at_zero() {
        let report = GapReport {
            gaps: vec![gap('A', 1, 90), gap('B', 1, 90)],
            discontinuities: vec![discontinuity('A', 95, 94)],
            ..GapReport::default()
        };

        let assessed = score(&report);

        assert_eq!(assessed.score, 0);
        assert_eq!(assessed.missing_residues, 180);
    }
}
