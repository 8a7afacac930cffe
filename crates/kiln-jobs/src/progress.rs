//! Progress event model for streaming training state to the controller.
//!
//! This is the canonical event contract between a running command and the
//! controller. Events are delivered over one FIFO queue and must be applied
//! in emission order; later events (best epoch) depend on earlier state.

use serde::{Deserialize, Serialize};

/// Upper limit of the progress-bar score window, as a power of ten.
const LOG10_UPPER: f64 = 1.0;
/// Lower limit of the progress-bar score window, as a power of ten.
const LOG10_LOWER: f64 = -10.0;

/// Progress emitted by a running command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Replace the displayed status line.
    StatusMessage { text: String },
    /// Replace the displayed results paragraph.
    ResultReport { text: String },
    /// Report the current epoch and its score.
    EpochUpdate { epoch: u32, score: f64, is_new_best: bool },
}

/// Terminal outcome of a worker run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded,
    Failed { message: String },
}

/// Everything the worker delivers to the controller queue.
#[derive(Debug, Clone)]
pub enum JobEvent {
    Progress(ProgressEvent),
    /// Posted exactly once per job, after the command exits.
    Completed(JobOutcome),
}

/// Map a score onto a `[0, 100]` progress percentage, viewed on a log scale
/// across the window `[10^-10, 10^1]`. Scores at or below the window floor
/// (and non-finite scores) map to 0.
#[must_use]
pub fn score_percent(score: f64) -> i32 {
    let min_score = 10.0_f64.powf(LOG10_LOWER);
    if !(score > min_score) {
        return 0;
    }
    let percent = (score.log10() - LOG10_LOWER) * 100.0 / (LOG10_UPPER - LOG10_LOWER);
    percent.clamp(0.0, 100.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_below_window_floor_maps_to_zero() {
        assert_eq!(score_percent(1e-11), 0);
        assert_eq!(score_percent(1e-10), 0);
        assert_eq!(score_percent(0.0), 0);
        assert_eq!(score_percent(-3.0), 0);
    }

    #[test]
    fn test_score_above_window_ceiling_clamps_to_hundred() {
        assert_eq!(score_percent(10.0), 100);
        assert_eq!(score_percent(1e6), 100);
    }

    #[test]
    fn test_midpoint_of_window_is_fifty() {
        // log10 = -4.5, halfway through [-10, 1].
        assert_eq!(score_percent(10.0_f64.powf(-4.5)), 50);
    }

    #[test]
    fn test_nan_maps_to_zero() {
        assert_eq!(score_percent(f64::NAN), 0);
    }
}
