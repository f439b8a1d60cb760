//! Runs the bounded stochastic modeling loop that produces candidate repairs.
//!
//! Each attempt starts from a clean clone of the stripped structure, closes
//! every gap through the injected search capability, relaxes the result, and
//! evaluates its energy. Attempts are isolated: a failure at any stage is
//! recorded and the loop simply moves on, because the search is stochastic
//! and the next attempt may succeed. The loop stops early once the target
//! number of decoys is collected, and unconditionally once the attempt
//! budget is spent. Only [`SearchError::Unavailable`] aborts the whole run,
//! since retrying a missing backend is pointless.

use super::config::RepairConfig;
use super::error::EngineError;
use super::gaps::Gap;
use super::progress::{Progress, ProgressReporter};
use super::search::{ConformationalSearch, SearchError, StatisticalPotential};
use crate::core::models::sequence::ReferenceSequence;
use crate::core::models::structure::Structure;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// One successfully modeled and evaluated candidate repair.
#[derive(Debug, Clone)]
pub struct Decoy {
    /// The 1-based attempt index that produced this decoy.
    pub attempt: usize,
    /// The relaxed, gap-free structure.
    pub structure: Structure,
    /// The physical energy of the relaxed structure. Lower is better.
    pub energy: f64,
    /// The statistical-potential score, when a potential was configured and
    /// its evaluation succeeded.
    pub statistical_score: Option<f64>,
}

/// The stage of a modeling attempt at which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStage {
    /// Building coordinates for a gap.
    Closure,
    /// Whole-structure relaxation.
    Relaxation,
    /// Energy evaluation of the relaxed structure.
    Energy,
}

impl fmt::Display for AttemptStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttemptStage::Closure => "loop closure",
            AttemptStage::Relaxation => "relaxation",
            AttemptStage::Energy => "energy evaluation",
        };
        write!(f, "{label}")
    }
}

/// A failed modeling attempt, preserved for diagnostics.
#[derive(Debug, Clone)]
pub struct AttemptFailure {
    /// The 1-based attempt index that failed.
    pub attempt: usize,
    /// The stage at which the attempt failed.
    pub stage: AttemptStage,
    /// The underlying failure message.
    pub message: String,
}

/// Why the attempt loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// The target number of decoys was collected before the budget ran out.
    TargetReached,
    /// The attempt budget was spent first.
    BudgetExhausted,
}

/// The outcome of one generation run.
#[derive(Debug)]
pub struct DecoyBatch {
    /// Usable decoys, in attempt order.
    pub decoys: Vec<Decoy>,
    /// Failed attempts, in attempt order.
    pub failures: Vec<AttemptFailure>,
    /// How many attempts were actually made.
    pub attempts_made: usize,
    /// Why the loop stopped.
    pub status: BatchStatus,
}

enum AttemptError {
    Search(AttemptStage, SearchError),
    TimedOut(AttemptStage, Duration),
}

impl AttemptError {
    fn into_failure(self, attempt: usize) -> AttemptFailure {
        match self {
            AttemptError::Search(stage, error) => AttemptFailure {
                attempt,
                stage,
                message: error.to_string(),
            },
            AttemptError::TimedOut(stage, limit) => AttemptFailure {
                attempt,
                stage,
                message: format!("wall-clock budget of {limit:?} exceeded"),
            },
        }
    }
}

/// Generates candidate repairs for the given gaps.
///
/// Requires a conformational-search capability; without one this returns
/// [`EngineError::CapabilityUnavailable`] immediately so the caller can fall
/// back to its manual-repair path. The same error aborts a run in flight if
/// the backend stops responding, discarding any decoys collected so far.
#[instrument(skip_all, fields(structure = %stripped.id(), gaps = gaps.len()))]
pub fn generate(
    stripped: &Structure,
    reference: &ReferenceSequence,
    gaps: &[Gap],
    search: Option<&dyn ConformationalSearch>,
    potential: Option<&dyn StatisticalPotential>,
    config: &RepairConfig,
    reporter: &ProgressReporter,
) -> Result<DecoyBatch, EngineError> {
    let Some(engine) = search else {
        return Err(EngineError::CapabilityUnavailable {
            reason: "no conformational search engine is configured".to_string(),
        });
    };
    cross_check_gaps(reference, gaps)?;

    if gaps.is_empty() {
        debug!("No gaps to model; returning an empty batch");
        return Ok(DecoyBatch {
            decoys: Vec::new(),
            failures: Vec::new(),
            attempts_made: 0,
            status: BatchStatus::TargetReached,
        });
    }

    let target = config.target_success_count;
    let budget = config.attempt_budget();
    let timeout = config.attempt_timeout();
    info!(target, budget, "Starting decoy generation");
    reporter.report(Progress::TaskStart {
        total_steps: budget as u64,
    });

    let mut decoys: Vec<Decoy> = Vec::new();
    let mut failures: Vec<AttemptFailure> = Vec::new();
    let mut attempts_made = 0;

    for attempt in 1..=budget {
        if decoys.len() >= target {
            break;
        }
        attempts_made = attempt;
        reporter.report(Progress::TaskIncrement);

        match run_attempt(engine, stripped, gaps, timeout) {
            Ok((structure, energy)) => {
                let statistical_score =
                    evaluate_potential(potential, &structure, attempt, reporter);
                debug!(attempt, energy, "Attempt produced a decoy");
                decoys.push(Decoy {
                    attempt,
                    structure,
                    energy,
                    statistical_score,
                });
            }
            Err(AttemptError::Search(_, SearchError::Unavailable(reason))) => {
                warn!(attempt, reason = %reason, "Search backend became unavailable; aborting generation");
                reporter.report(Progress::TaskFinish);
                return Err(EngineError::CapabilityUnavailable { reason });
            }
            Err(error) => {
                let failure = error.into_failure(attempt);
                warn!(
                    attempt,
                    stage = %failure.stage,
                    message = %failure.message,
                    "Attempt failed; continuing with the next one"
                );
                reporter.report(Progress::Message(format!(
                    "attempt {attempt} failed during {}: {}",
                    failure.stage, failure.message
                )));
                failures.push(failure);
            }
        }

        reporter.report(Progress::StatusUpdate {
            successes: decoys.len(),
            failures: failures.len(),
        });
    }

    reporter.report(Progress::TaskFinish);
    let status = if decoys.len() >= target {
        BatchStatus::TargetReached
    } else {
        BatchStatus::BudgetExhausted
    };
    info!(
        successes = decoys.len(),
        failures = failures.len(),
        attempts = attempts_made,
        ?status,
        "Decoy generation finished"
    );

    Ok(DecoyBatch {
        decoys,
        failures,
        attempts_made,
        status,
    })
}

fn cross_check_gaps(reference: &ReferenceSequence, gaps: &[Gap]) -> Result<(), EngineError> {
    for gap in gaps {
        if gap.start < 1 || gap.end < gap.start {
            return Err(EngineError::InvalidReferenceSequence {
                chain_id: gap.chain_id,
                reason: format!("gap {}-{} is malformed", gap.start, gap.end),
            });
        }
        let expected = reference.subsequence(gap.chain_id, gap.start as usize, gap.end as usize);
        if expected != Some(gap.sequence.as_str()) {
            return Err(EngineError::InvalidReferenceSequence {
                chain_id: gap.chain_id,
                reason: format!(
                    "gap {}-{} expects '{}' but the reference provides '{}'",
                    gap.start,
                    gap.end,
                    gap.sequence,
                    expected.unwrap_or("nothing")
                ),
            });
        }
    }
    Ok(())
}

fn run_attempt(
    engine: &dyn ConformationalSearch,
    stripped: &Structure,
    gaps: &[Gap],
    timeout: Option<Duration>,
) -> Result<(Structure, f64), AttemptError> {
    let started = Instant::now();
    let mut working = stripped.clone();
    for gap in gaps {
        working = engine
            .close_loop(&working, gap)
            .map_err(|error| AttemptError::Search(AttemptStage::Closure, error))?;
        check_deadline(started, timeout, AttemptStage::Closure)?;
    }
    let relaxed = engine
        .relax(&working)
        .map_err(|error| AttemptError::Search(AttemptStage::Relaxation, error))?;
    check_deadline(started, timeout, AttemptStage::Relaxation)?;
    let energy = engine
        .energy(&relaxed)
        .map_err(|error| AttemptError::Search(AttemptStage::Energy, error))?;
    Ok((relaxed, energy))
}

fn check_deadline(
    started: Instant,
    timeout: Option<Duration>,
    stage: AttemptStage,
) -> Result<(), AttemptError> {
    match timeout {
        Some(limit) if started.elapsed() > limit => Err(AttemptError::TimedOut(stage, limit)),
        _ => Ok(()),
    }
}

fn evaluate_potential(
    potential: Option<&dyn StatisticalPotential>,
    structure: &Structure,
    attempt: usize,
    reporter: &ProgressReporter,
) -> Option<f64> {
    let potential = potential?;
    match potential.score(structure) {
        Ok(score) => Some(score),
        Err(error) => {
            warn!(attempt, error = %error, "Statistical rescoring failed; keeping decoy with energy only");
            reporter.report(Progress::Message(format!(
                "attempt {attempt}: statistical rescoring failed ({error}); keeping energy-only decoy"
            )));
            None
        }
    }
}
