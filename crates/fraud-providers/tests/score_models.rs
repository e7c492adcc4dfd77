// fraud-providers/tests/score_models.rs
// ============================================================================
// Integration tests: the three ScoreModel stand-ins behave consistently
// against the ensemble's expectations (§4.3): scores in [0, 1], explanations
// capped at five entries, and a documented neutral score when degraded.
// ============================================================================
#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used, reason = "Test-only panic-based assertions are permitted.")]

use fraud_core::Channel;
use fraud_core::ComputationMeta;
use fraud_core::EntityId;
use fraud_core::EventId;
use fraud_core::FeatureVector;
use fraud_core::ScoreModel;
use fraud_core::Timestamp;
use fraud_core::VelocityCounts;
use fraud_providers::GradientBoostedModel;
use fraud_providers::NeuralModel;
use fraud_providers::RulesModel;

fn high_risk_features() -> FeatureVector {
    FeatureVector {
        event_id: EventId::new("evt-1"),
        entity_id: EntityId::new("ent-1"),
        computed_at: Timestamp::now(),
        amount: 25_000.0,
        currency: "USD".to_string(),
        channel: Some(Channel::Web),
        velocity: VelocityCounts { window_1h: 20, window_24h: 20, window_7d: 20 },
        ip_risk: 0.97,
        merchant_risk: 0.88,
        geolocation: None,
        geo_distance_km: 1500.0,
        account_age_days: 1,
        device_fingerprint: None,
        session_id: None,
        user_agent_hash: None,
        schema_version: 1,
        computation: ComputationMeta { compute_time_ms: 0, cache_hit: true, data_freshness_minutes: 0 },
    }
}

#[test]
fn every_loaded_model_scores_within_unit_interval() {
    let features = high_risk_features();
    let models: Vec<Box<dyn ScoreModel>> =
        vec![Box::new(GradientBoostedModel::loaded()), Box::new(NeuralModel::loaded()), Box::new(RulesModel::new())];
    for model in &models {
        let score = model.score(&features);
        assert!((0.0..=1.0).contains(&score), "{} scored {score} outside [0, 1]", model.version());
    }
}

#[test]
fn every_loaded_model_caps_explanation_at_five_entries() {
    let features = high_risk_features();
    let models: Vec<Box<dyn ScoreModel>> =
        vec![Box::new(GradientBoostedModel::loaded()), Box::new(NeuralModel::loaded()), Box::new(RulesModel::new())];
    for model in &models {
        assert!(model.explain(&features).len() <= 5);
    }
}

#[test]
fn degraded_stand_ins_report_the_neutral_score_and_version() {
    let features = high_risk_features();
    let gbm = GradientBoostedModel::degraded();
    let nn = NeuralModel::degraded();
    assert!((gbm.score(&features) - 0.1).abs() < 1e-9);
    assert!((nn.score(&features) - 0.1).abs() < 1e-9);
    assert_eq!(gbm.version().to_string(), "degraded");
    assert_eq!(nn.version().to_string(), "degraded");
}

#[test]
fn rules_model_has_no_degraded_variant_and_matches_core_directly() {
    let model = RulesModel::new();
    assert_eq!(model.version().to_string(), RulesModel::VERSION);
    assert!((model.score(&high_risk_features()) - 1.0).abs() < 1e-9);
}
