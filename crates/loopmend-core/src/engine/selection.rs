//! Ranks decoys and picks the one to merge back into the original entry.
//!
//! The combined score is `energy + weight * statistical_score`; decoys whose
//! statistical rescoring was skipped or failed compete on energy alone.
//! Selection is deterministic: the lowest combined score wins, and equal
//! scores resolve to the earliest attempt.

use super::decoys::{Decoy, DecoyBatch};
use super::error::EngineError;
use tracing::debug;

/// Computes a decoy's combined score under the given statistical weight.
pub fn combined_score(decoy: &Decoy, statistical_weight: f64) -> f64 {
    match decoy.statistical_score {
        Some(statistical) => decoy.energy + statistical_weight * statistical,
        None => decoy.energy,
    }
}

/// Selects the best decoy from a batch.
///
/// Returns [`EngineError::NoViableDecoy`] when the batch holds no decoys at
/// all, carrying the attempt and failure counts for diagnostics.
pub fn select_best(
    batch: &DecoyBatch,
    statistical_weight: f64,
) -> Result<&Decoy, EngineError> {
    let mut best: Option<(&Decoy, f64)> = None;

    for decoy in &batch.decoys {
        let score = combined_score(decoy, statistical_weight);
        let replace = match best {
            None => true,
            Some((current, current_score)) => {
                score < current_score || (score == current_score && decoy.attempt < current.attempt)
            }
        };
        if replace {
            best = Some((decoy, score));
        }
    }

    match best {
        Some((decoy, score)) => {
            debug!(
                attempt = decoy.attempt,
                combined_score = score,
                candidates = batch.decoys.len(),
                "Selected best decoy"
            );
            Ok(decoy)
        }
        None => Err(EngineError::NoViableDecoy {
            attempts: batch.attempts_made,
            failures: batch.failures.len(),
        }),
    }
}
