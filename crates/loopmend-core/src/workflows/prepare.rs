use crate::core::models::sequence::ReferenceSequence;
use crate::core::models::structure::Structure;
use crate::engine::config::RepairConfig;
use crate::engine::decoys::{self, AttemptFailure};
use crate::engine::error::EngineError;
use crate::engine::gaps::{self, Gap, GapReport};
use crate::engine::merge;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::quality::{self, ScoreReport};
use crate::engine::renumber::{self, HeteroNumbering};
use crate::engine::search::SearchCapabilities;
use crate::engine::selection;
use std::fmt;
use tracing::{info, instrument, warn};

/// The terminal state a preparation run ended in.
#[derive(Debug, Clone, PartialEq)]
pub enum RepairOutcome {
    /// No gaps were found; the original structure was returned untouched.
    AlreadyComplete,
    /// A decoy was merged back into the original.
    Repaired {
        /// The attempt index of the winning decoy.
        attempt: usize,
        /// Its combined score under the configured statistical weight.
        combined_score: f64,
    },
    /// Automatic modeling could not produce a repair; the original structure
    /// was returned and the gaps need manual attention.
    ManualRepairRequested {
        /// Why the run fell back.
        reason: FallbackReason,
    },
}

/// Why a run fell back to requesting manual repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No conformational-search capability was configured, or the configured
    /// one stopped responding.
    SearchUnavailable {
        /// The underlying unavailability message.
        reason: String,
    },
    /// Every modeling attempt failed.
    NoViableDecoy {
        /// How many attempts were made.
        attempts: usize,
        /// How many of them failed (the rest never ran).
        failures: usize,
    },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::SearchUnavailable { reason } => {
                write!(f, "conformational search unavailable: {reason}")
            }
            FallbackReason::NoViableDecoy { attempts, failures } => {
                write!(
                    f,
                    "no viable decoy after {attempts} attempts ({failures} failures)"
                )
            }
        }
    }
}

/// Everything a preparation run produced.
#[derive(Debug)]
pub struct PrepareResult {
    /// The terminal structure: repaired (and possibly renumbered), or the
    /// original when nothing was repaired.
    pub structure: Structure,
    /// The completeness assessment of the deposited structure.
    pub before: ScoreReport,
    /// The completeness assessment of the terminal structure. Equals
    /// `before` on the non-repaired paths.
    pub after: ScoreReport,
    /// The gaps found in the deposited structure.
    pub gaps: Vec<Gap>,
    /// How the run ended.
    pub outcome: RepairOutcome,
    /// How many modeling attempts were made.
    pub attempts_made: usize,
    /// The individual attempt failures, for audit.
    pub failures: Vec<AttemptFailure>,
}

/// Runs the full preparation pipeline on one structure.
///
/// Detects gaps, scores the deposited structure, and, when gaps exist and a
/// search capability is injected, models them through the bounded attempt
/// loop, merges the best decoy back, rescores, and optionally renumbers.
/// Missing or failing capabilities downgrade the run to a
/// [`RepairOutcome::ManualRepairRequested`] result instead of an error;
/// `Err` is reserved for an unusable reference sequence and for merge
/// conflicts.
#[instrument(skip_all, name = "prepare_workflow", fields(structure = %original.id()))]
pub fn run(
    original: &Structure,
    reference: &ReferenceSequence,
    capabilities: &SearchCapabilities<'_>,
    config: &RepairConfig,
    reporter: &ProgressReporter,
) -> Result<PrepareResult, EngineError> {
    info!("Starting structure preparation workflow");

    // === Phase 1: Gap detection and initial assessment ===
    let (report, before) = assess(original, reference, "Gap detection", reporter)?;
    info!(
        score = before.score,
        gaps = before.gap_count,
        discontinuities = before.discontinuity_count,
        missing_residues = before.missing_residues,
        "Assessed deposited structure"
    );

    if report.gaps.is_empty() {
        info!("No gaps to repair; returning the structure unchanged");
        return Ok(PrepareResult {
            structure: original.clone(),
            before,
            after: before,
            gaps: Vec::new(),
            outcome: RepairOutcome::AlreadyComplete,
            attempts_made: 0,
            failures: Vec::new(),
        });
    }

    // === Phase 2: Heteroatom stripping ===
    let stripped = strip_heteroatoms(original, reporter);

    // === Phase 3: Decoy generation ===
    reporter.report(Progress::PhaseStart {
        name: "Decoy generation",
    });
    let batch = match decoys::generate(
        &stripped,
        reference,
        &report.gaps,
        capabilities.search,
        capabilities.potential,
        config,
        reporter,
    ) {
        Ok(batch) => batch,
        Err(EngineError::CapabilityUnavailable { reason }) => {
            reporter.report(Progress::PhaseFinish);
            warn!(reason = %reason, "Conformational search unavailable; manual repair required");
            return Ok(fallback(
                original,
                before,
                report.gaps,
                FallbackReason::SearchUnavailable { reason },
                0,
                Vec::new(),
            ));
        }
        Err(error) => return Err(error),
    };
    reporter.report(Progress::PhaseFinish);

    // === Phase 4: Decoy selection ===
    reporter.report(Progress::PhaseStart {
        name: "Decoy selection",
    });
    let selected = match selection::select_best(&batch, config.statistical_weight) {
        Ok(selected) => selected,
        Err(EngineError::NoViableDecoy { attempts, failures }) => {
            reporter.report(Progress::PhaseFinish);
            warn!(attempts, failures, "All modeling attempts failed; manual repair required");
            return Ok(fallback(
                original,
                before,
                report.gaps,
                FallbackReason::NoViableDecoy { attempts, failures },
                batch.attempts_made,
                batch.failures,
            ));
        }
        Err(error) => return Err(error),
    };
    let best_attempt = selected.attempt;
    let combined_score = selection::combined_score(selected, config.statistical_weight);
    info!(
        attempt = best_attempt,
        combined_score,
        candidates = batch.decoys.len(),
        "Selected best decoy"
    );
    reporter.report(Progress::PhaseFinish);

    // === Phase 5: Merging ===
    reporter.report(Progress::PhaseStart {
        name: "Loop merging",
    });
    let merged = merge::merge(original, selected, &report.gaps)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 6: Rescoring with the identical scorer ===
    let (_, after) = assess(&merged, reference, "Rescoring", reporter)?;
    info!(
        before = before.score,
        after = after.score,
        "Rescored repaired structure"
    );

    // === Phase 7: Renumbering (optional) ===
    let structure = if config.renumber {
        renumber_structure(&merged, config, reporter)
    } else {
        merged
    };

    info!("Preparation workflow complete");
    Ok(PrepareResult {
        structure,
        before,
        after,
        gaps: report.gaps,
        outcome: RepairOutcome::Repaired {
            attempt: best_attempt,
            combined_score,
        },
        attempts_made: batch.attempts_made,
        failures: batch.failures,
    })
}

fn assess(
    structure: &Structure,
    reference: &ReferenceSequence,
    phase: &'static str,
    reporter: &ProgressReporter,
) -> Result<(GapReport, ScoreReport), EngineError> {
    reporter.report(Progress::PhaseStart { name: phase });
    let report = gaps::detect(structure, reference)?;
    let assessed = quality::score(&report);
    reporter.report(Progress::PhaseFinish);
    Ok((report, assessed))
}

fn strip_heteroatoms(original: &Structure, reporter: &ProgressReporter) -> Structure {
    reporter.report(Progress::PhaseStart {
        name: "Heteroatom stripping",
    });
    let stripped = original.strip_non_polymer();
    info!(
        removed = original.non_polymer_residue_count(),
        "Stripped heteroatoms before modeling"
    );
    reporter.report(Progress::PhaseFinish);
    stripped
}

fn renumber_structure(
    merged: &Structure,
    config: &RepairConfig,
    reporter: &ProgressReporter,
) -> Structure {
    reporter.report(Progress::PhaseStart {
        name: "Renumbering",
    });
    let policy = if config.renumber_heteroatoms_independently {
        HeteroNumbering::Independent
    } else {
        HeteroNumbering::Preserve
    };
    let renumbered = renumber::renumber(merged, policy);
    reporter.report(Progress::PhaseFinish);
    renumbered
}

fn fallback(
    original: &Structure,
    before: ScoreReport,
    gaps: Vec<Gap>,
    reason: FallbackReason,
    attempts_made: usize,
    failures: Vec<AttemptFailure>,
) -> PrepareResult {
    PrepareResult {
        structure: original.clone(),
        before,
        after: before,
        gaps,
        outcome: RepairOutcome::ManualRepairRequested { reason },
        attempts_made,
        failures,
    }
}
