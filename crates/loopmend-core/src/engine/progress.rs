//! Provides progress reporting for long-running pipeline operations.
//!
//! This module defines a simple event-based mechanism that decouples the
//! engine from any particular user interface. The workflow emits
//! [`Progress`] events through a [`ProgressReporter`], and front-ends (a CLI
//! progress bar, a log sink, a test harness) subscribe by installing a
//! callback. When no callback is installed, reporting is a no-op.

/// Events describing the advancement of a repair run.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// A new phase of the pipeline has started.
    PhaseStart {
        /// A human-readable name for the phase.
        name: &'static str,
    },
    /// The current phase has finished.
    PhaseFinish,
    /// A counted task (the modeling attempt loop) has started.
    TaskStart {
        /// The upper bound on the number of steps the task may take.
        total_steps: u64,
    },
    /// One step of the current counted task has completed.
    TaskIncrement,
    /// The current counted task has finished, possibly before exhausting its
    /// step budget.
    TaskFinish,
    /// A running tally of the attempt loop, emitted after every attempt.
    StatusUpdate {
        /// Decoys accepted so far.
        successes: usize,
        /// Attempts that failed so far.
        failures: usize,
    },
    /// A free-form informational message.
    Message(String),
}

/// The type of callback function used to report progress.
pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Dispatches progress events to an optional callback.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    /// Creates a new reporter that discards all events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reporter that forwards every event to the given callback.
    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// Reports a progress event to the callback, if one is installed.
    #[inline]
    pub fn report(&self, progress: Progress) {
        if let Some(callback) = &self.callback {
            callback(progress);
        }
    }
}
