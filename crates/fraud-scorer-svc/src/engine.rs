// fraud-scorer-svc/src/engine.rs
// ============================================================================
// Module: Scoring Engine
// Description: Combines the three ScoreModel sub-scorers into a ScoreOutput.
// Purpose: Pure composition root for §4.3's ensemble and calibration step.
// Dependencies: fraud-core, fraud-providers
// ============================================================================

//! ## Overview
//! [`ScoringEngine::compute`] runs the three sub-scorers, combines them with
//! [`fraud_core::weighted_ensemble`], calibrates with
//! [`fraud_core::platt_calibrate`], and takes its explanation and reported
//! `model_version` from the gradient-boosted model — the one `fraud-providers`
//! attaches real per-feature attribution to (§4.3 "Explanation").

use std::time::Instant;

use fraud_core::CalibrationError;
use fraud_core::EnsembleWeights;
use fraud_core::Explanation;
use fraud_core::FeatureVector;
use fraud_core::ModelScores;
use fraud_core::PlattParams;
use fraud_core::ScoreModel;
use fraud_core::ScoreOutput;
use fraud_core::platt_calibrate;
use fraud_core::weighted_ensemble;

/// Combines the gradient-boosted, neural, and rules sub-scorers into one
/// calibrated [`ScoreOutput`].
pub struct ScoringEngine {
    gradient_boosted: Box<dyn ScoreModel + Send + Sync>,
    neural: Box<dyn ScoreModel + Send + Sync>,
    rules: Box<dyn ScoreModel + Send + Sync>,
    weights: EnsembleWeights,
    platt: PlattParams,
}

impl ScoringEngine {
    /// Builds a scoring engine over the three sub-scorers and the ensemble's
    /// weighting/calibration parameters.
    #[must_use]
    pub fn new(
        gradient_boosted: Box<dyn ScoreModel + Send + Sync>,
        neural: Box<dyn ScoreModel + Send + Sync>,
        rules: Box<dyn ScoreModel + Send + Sync>,
        weights: EnsembleWeights,
        platt: PlattParams,
    ) -> Self {
        Self { gradient_boosted, neural, rules, weights, platt }
    }

    /// Scores one feature vector, returning the full sub-score breakdown,
    /// calibrated ensemble score, and explanation (§4.3).
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError`] if the configured ensemble weights do not
    /// sum to `1.0` — a configuration defect caught at load time
    /// (`EnsembleConfig::validate`), surfaced here rather than silently
    /// renormalized.
    pub fn compute(&self, features: &FeatureVector) -> Result<ScoreOutput, CalibrationError> {
        let start = Instant::now();

        let xgb = self.gradient_boosted.score(features);
        let nn = self.neural.score(features);
        let rules = self.rules.score(features);
        let ensemble = weighted_ensemble(xgb, nn, rules, self.weights)?;
        let calibrated = platt_calibrate(ensemble, self.platt);

        let scores = ModelScores { xgb, nn, rules, ensemble, calibrated };
        let explain: Explanation = self.gradient_boosted.explain(features);

        #[expect(clippy::cast_possible_truncation, reason = "scoring never approaches u64::MAX milliseconds")]
        let computation_time_ms = start.elapsed().as_millis() as u64;

        Ok(ScoreOutput {
            event_id: features.event_id.clone(),
            scores,
            explain,
            model_version: self.gradient_boosted.version(),
            computation_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use fraud_core::DEFAULT_ENSEMBLE_WEIGHTS;
    use fraud_core::DEFAULT_PLATT_PARAMS;
    use fraud_providers::GradientBoostedModel;
    use fraud_providers::NeuralModel;
    use fraud_providers::RulesModel;

    use super::*;

    fn loaded_engine() -> ScoringEngine {
        ScoringEngine::new(
            Box::new(GradientBoostedModel::loaded()),
            Box::new(NeuralModel::loaded()),
            Box::new(RulesModel::new()),
            DEFAULT_ENSEMBLE_WEIGHTS,
            DEFAULT_PLATT_PARAMS,
        )
    }

    fn feature_vector(amount: f64) -> FeatureVector {
        FeatureVector {
            event_id: fraud_core::EventId::new("evt-1"),
            entity_id: fraud_core::EntityId::new("ent-1"),
            computed_at: fraud_core::Timestamp::now(),
            amount,
            currency: "USD".to_string(),
            channel: Some(fraud_core::Channel::Web),
            velocity: fraud_core::VelocityCounts { window_1h: 1, window_24h: 1, window_7d: 1 },
            ip_risk: 0.05,
            merchant_risk: 0.02,
            geolocation: None,
            geo_distance_km: 0.0,
            account_age_days: 730,
            device_fingerprint: None,
            session_id: None,
            user_agent_hash: None,
            schema_version: 1,
            computation: fraud_core::ComputationMeta { compute_time_ms: 0, cache_hit: true, data_freshness_minutes: 0 },
        }
    }

    #[test]
    fn calibrated_score_stays_within_unit_interval() {
        let engine = loaded_engine();
        let output = engine.compute(&feature_vector(20_000.0)).expect("valid weights");
        assert!((0.0..=1.0).contains(&output.scores.calibrated));
        assert!(output.scores.validate().is_ok());
    }

    #[test]
    fn low_risk_features_score_below_high_risk_features() {
        let engine = loaded_engine();
        let low = engine.compute(&feature_vector(50.0)).expect("valid weights");
        let high = engine.compute(&feature_vector(20_000.0)).expect("valid weights");
        assert!(low.scores.calibrated < high.scores.calibrated);
    }

    #[test]
    fn unnormalized_weights_are_rejected_rather_than_renormalized() {
        let engine = ScoringEngine::new(
            Box::new(GradientBoostedModel::loaded()),
            Box::new(NeuralModel::loaded()),
            Box::new(RulesModel::new()),
            EnsembleWeights { gradient_boosted: 0.5, neural: 0.5, rules: 0.5 },
            DEFAULT_PLATT_PARAMS,
        );
        assert!(engine.compute(&feature_vector(100.0)).is_err());
    }

    #[test]
    fn degraded_model_is_reflected_in_model_version() {
        let engine = ScoringEngine::new(
            Box::new(GradientBoostedModel::degraded()),
            Box::new(NeuralModel::degraded()),
            Box::new(RulesModel::new()),
            DEFAULT_ENSEMBLE_WEIGHTS,
            DEFAULT_PLATT_PARAMS,
        );
        let output = engine.compute(&feature_vector(100.0)).expect("valid weights");
        assert_eq!(output.model_version.to_string(), "degraded");
    }
}
