use indicatif::{ProgressBar, ProgressStyle};
use loopmend::engine::progress::{Progress, ProgressCallback};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// Renders engine progress events as an indicatif bar on stderr.
///
/// Phases draw as a spinner carrying the phase name; the attempt loop draws
/// as a counted bar whose message holds the live success/failure tally. The
/// underlying `ProgressBar` is internally reference-counted, so the handler
/// clones it into the callback and both sides observe the same bar.
pub struct CliProgressHandler {
    bar: ProgressBar,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        bar.finish_and_clear();

        Self { bar }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();

        Box::new(move |progress: Progress| match progress {
            Progress::PhaseStart { name } => {
                bar.reset();
                bar.set_length(0);
                bar.set_style(Self::spinner_style());
                bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                bar.set_message(name);
            }
            Progress::PhaseFinish => {
                bar.disable_steady_tick();
                bar.finish_with_message("✓ Done");
            }
            Progress::TaskStart { total_steps } => {
                bar.disable_steady_tick();
                bar.reset();
                bar.set_length(total_steps);
                bar.set_position(0);
                bar.set_style(Self::bar_style());
                bar.set_message("0 ok / 0 failed");
            }
            Progress::TaskIncrement => {
                bar.inc(1);
            }
            Progress::TaskFinish => {
                // The attempt loop may stop before the budget is spent; the
                // bar stays at the attempts actually made.
                bar.finish();
            }
            Progress::StatusUpdate {
                successes,
                failures,
            } => {
                bar.set_message(format!("{successes} ok / {failures} failed"));
            }
            Progress::Message(msg) => {
                if bar.is_finished() {
                    bar.set_message(msg);
                } else {
                    bar.println(format!("  {}", msg));
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<18} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})")
            .expect("Failed to create bar style template")
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
