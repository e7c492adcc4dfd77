// fraud-core/src/runtime/brier.rs
// ============================================================================
// Module: Brier Score
// Description: Calibration metric over probabilistic predictions.
// Purpose: Pure Brier score computation consumed by the monitor.
// Dependencies: none (pure)
// ============================================================================

//! ## Overview
//! `Brier = (1/n) * sum((p_i - y_i)^2)` over the last 100 observations
//! (§4.6). A proper ground-truth label is preferred; absent one, the monitor
//! falls back to the degenerate self-label `y = (score > 0.5)` and tags the
//! resulting gauge `proxy_label = true` (§9 Open Question resolution).

/// Number of trailing observations the Brier gauge is computed over (§4.6).
pub const BRIER_WINDOW: usize = 100;

/// A single (prediction, label) observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrierObservation {
    /// Model's predicted probability.
    pub predicted: f64,
    /// Ground-truth label, `0.0` or `1.0`.
    pub label: f64,
}

/// Computes the Brier score over `observations`. Returns `0.0` for an empty
/// slice (nothing to score).
#[must_use]
pub fn brier_score(observations: &[BrierObservation]) -> f64 {
    if observations.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = observations.iter().map(|o| (o.predicted - o.label).powi(2)).sum();
    sum_sq / observations.len() as f64
}

/// Derives the degenerate self-label `y = (score > 0.5)` used when no
/// external ground truth is available (§9 Open Question resolution).
#[must_use]
pub fn proxy_label(score: f64) -> f64 {
    f64::from(u8::from(score > 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions_score_zero() {
        let observations = [
            BrierObservation { predicted: 1.0, label: 1.0 },
            BrierObservation { predicted: 0.0, label: 0.0 },
        ];
        assert!((brier_score(&observations)).abs() < 1e-9);
    }

    #[test]
    fn worst_case_predictions_score_one() {
        let observations = [
            BrierObservation { predicted: 1.0, label: 0.0 },
            BrierObservation { predicted: 0.0, label: 1.0 },
        ];
        assert!((brier_score(&observations) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn proxy_label_matches_half_threshold() {
        assert!((proxy_label(0.6) - 1.0).abs() < 1e-9);
        assert!((proxy_label(0.4)).abs() < 1e-9);
    }
}
