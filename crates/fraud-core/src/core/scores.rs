// fraud-core/src/core/scores.rs
// ============================================================================
// Module: Model Scores
// Description: Ensemble scorer output and attribution.
// Purpose: Canonical score record published to alerts.scores.v1.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! `ModelScores` carries every sub-score plus the calibrated risk the
//! decision engine thresholds against (§3, §4.3). All five fields are bounded
//! to `[0, 1]`; `ModelScores::validate` checks this for the property tests in
//! §8 ("Score range").

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

use super::identifiers::EventId;
use super::identifiers::ModelVersion;

/// One (feature, importance) attribution pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// Feature name this attribution concerns.
    pub feature_name: String,
    /// Signed importance; entries are sorted by `importance.abs()` descending.
    pub importance: f64,
}

/// Ordered attribution list, capped at 5 entries per §3.
pub type Explanation = SmallVec<[Attribution; 5]>;

/// Raw sub-scores and the calibrated ensemble output, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelScores {
    /// Gradient-boosted model score.
    pub xgb: f64,
    /// Neural network score.
    pub nn: f64,
    /// Deterministic rules score.
    pub rules: f64,
    /// Weighted ensemble of the three sub-scores.
    pub ensemble: f64,
    /// Platt-calibrated ensemble score; what policy thresholds read.
    pub calibrated: f64,
}

impl ModelScores {
    /// Validates that every sub-score is within `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason for the first out-of-range field.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("xgb", self.xgb),
            ("nn", self.nn),
            ("rules", self.rules),
            ("ensemble", self.ensemble),
            ("calibrated", self.calibrated),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be within [0, 1], got {value}"));
            }
        }
        Ok(())
    }
}

/// Full score output published to `alerts.scores.v1` (§4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutput {
    /// Event these scores concern.
    pub event_id: EventId,
    /// The computed scores.
    pub scores: ModelScores,
    /// Attribution for the gradient-boosted score, or a deterministic proxy.
    pub explain: Explanation,
    /// Model version used; `"degraded"` when a loaded model was absent.
    pub model_version: ModelVersion,
    /// Wall-clock milliseconds spent scoring.
    pub computation_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_scores_pass() {
        let scores =
            ModelScores { xgb: 0.1, nn: 0.2, rules: 0.3, ensemble: 0.2, calibrated: 0.4 };
        assert!(scores.validate().is_ok());
    }

    #[test]
    fn out_of_range_score_fails() {
        let scores =
            ModelScores { xgb: 1.2, nn: 0.2, rules: 0.3, ensemble: 0.2, calibrated: 0.4 };
        assert!(scores.validate().is_err());
    }
}
