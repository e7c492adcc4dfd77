// fraud-core/src/runtime/calibration.rs
// ============================================================================
// Module: Calibration
// Description: Ensemble weighting and Platt-style calibration.
// Purpose: Pure numeric path from sub-scores to the calibrated risk score.
// Dependencies: none (pure)
// ============================================================================

//! ## Overview
//! `weighted_ensemble` and `platt_calibrate` are the two pure functions
//! connecting the ensemble scorer's three sub-scores to the decision
//! engine's thresholded `calibrated` field (§4.3). Both are deterministic:
//! byte-identical inputs on a fixed model version produce byte-identical
//! output (§7 "Idempotence", §9 "Mixed numeric precision").

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Per-sub-score weights for the ensemble combination (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeights {
    /// Weight on the gradient-boosted score.
    pub gradient_boosted: f64,
    /// Weight on the neural score.
    pub neural: f64,
    /// Weight on the rules score.
    pub rules: f64,
}

/// Default ensemble weights `(0.5, 0.3, 0.2)` per §4.3.
pub const DEFAULT_ENSEMBLE_WEIGHTS: EnsembleWeights =
    EnsembleWeights { gradient_boosted: 0.5, neural: 0.3, rules: 0.2 };

/// Platt-style calibration parameters, attached per model version
/// (§9 Open Question resolution) rather than fixed globally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattParams {
    /// Logistic steepness.
    pub k: f64,
    /// Logistic midpoint.
    pub x0: f64,
}

/// Default Platt parameters `(k=5, x0=0.5)` per §4.3.
pub const DEFAULT_PLATT_PARAMS: PlattParams = PlattParams { k: 5.0, x0: 0.5 };

/// Ensemble weighting errors.
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// Weights must sum to `1.0` within tolerance `1e-9` (§4.3).
    #[error("ensemble weights must sum to 1.0 (±1e-9), got {0}")]
    WeightsNotNormalized(f64),
}

/// Tolerance for the weight-sum invariant (§4.3, §8 "Weight consistency").
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

impl EnsembleWeights {
    /// Validates that the three weights sum to `1.0` within tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::WeightsNotNormalized`] otherwise.
    pub fn validate(self) -> Result<(), CalibrationError> {
        let sum = self.gradient_boosted + self.neural + self.rules;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CalibrationError::WeightsNotNormalized(sum));
        }
        Ok(())
    }
}

/// Computes the weighted sum `s_e = w_g*s_g + w_n*s_n + w_r*s_r` (§4.3).
///
/// # Errors
///
/// Returns [`CalibrationError`] when `weights` does not sum to `1.0`.
pub fn weighted_ensemble(
    gradient_boosted: f64,
    neural: f64,
    rules: f64,
    weights: EnsembleWeights,
) -> Result<f64, CalibrationError> {
    weights.validate()?;
    Ok(weights.gradient_boosted.mul_add(
        gradient_boosted,
        weights.neural.mul_add(neural, weights.rules * rules),
    ))
}

/// Computes the Platt-style logistic calibration
/// `s_c = 1 / (1 + exp(-k * (s_e - x0)))` (§4.3).
#[must_use]
pub fn platt_calibrate(ensemble_score: f64, params: PlattParams) -> f64 {
    1.0 / (1.0 + (-params.k * (ensemble_score - params.x0)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_ensemble_matches_manual_computation() {
        let result =
            weighted_ensemble(0.2, 0.4, 0.6, DEFAULT_ENSEMBLE_WEIGHTS).expect("valid weights");
        let expected = 0.5 * 0.2 + 0.3 * 0.4 + 0.2 * 0.6;
        assert!((result - expected).abs() < 1e-9);
    }

    #[test]
    fn unnormalized_weights_are_rejected() {
        let bad = EnsembleWeights { gradient_boosted: 0.5, neural: 0.5, rules: 0.5 };
        assert!(weighted_ensemble(0.1, 0.1, 0.1, bad).is_err());
    }

    #[test]
    fn platt_calibration_is_monotone() {
        let low = platt_calibrate(0.2, DEFAULT_PLATT_PARAMS);
        let high = platt_calibrate(0.8, DEFAULT_PLATT_PARAMS);
        assert!(low < high);
    }

    #[test]
    fn platt_calibration_midpoint_is_one_half() {
        let midpoint = platt_calibrate(DEFAULT_PLATT_PARAMS.x0, DEFAULT_PLATT_PARAMS);
        assert!((midpoint - 0.5).abs() < 1e-9);
    }

    proptest::proptest! {
        #[test]
        fn platt_calibration_stays_in_unit_interval(score in -10.0f64..10.0) {
            let calibrated = platt_calibrate(score, DEFAULT_PLATT_PARAMS);
            proptest::prop_assert!((0.0..=1.0).contains(&calibrated));
        }

        #[test]
        fn platt_calibration_is_strictly_monotone(x in -5.0f64..4.9, delta in 0.01f64..5.0) {
            let y = x + delta;
            proptest::prop_assert!(platt_calibrate(x, DEFAULT_PLATT_PARAMS) < platt_calibrate(y, DEFAULT_PLATT_PARAMS));
        }
    }
}
