// fraud-core/tests/seed_scenarios.rs
// ============================================================================
// Integration tests covering the numeric seed scenarios from the testable
// properties scenario suite.
// ============================================================================

use fraud_core::ComputationMeta;
use fraud_core::DEFAULT_ENSEMBLE_WEIGHTS;
use fraud_core::DEFAULT_PLATT_PARAMS;
use fraud_core::EntityId;
use fraud_core::EventId;
use fraud_core::FeatureVector;
use fraud_core::Timestamp;
use fraud_core::VelocityCounts;
use fraud_core::platt_calibrate;
use fraud_core::rules_score;
use fraud_core::weighted_ensemble;

fn feature_vector(amount: f64, velocity_1h: u64, ip_risk: f64, geo_distance_km: f64, merchant_risk: f64) -> FeatureVector {
    FeatureVector {
        event_id: EventId::new("evt-seed"),
        entity_id: EntityId::new("ent-seed"),
        computed_at: Timestamp::now(),
        amount,
        currency: "USD".to_string(),
        channel: None,
        velocity: VelocityCounts { window_1h: velocity_1h, window_24h: velocity_1h, window_7d: velocity_1h },
        ip_risk,
        merchant_risk,
        geolocation: None,
        geo_distance_km,
        account_age_days: 365,
        device_fingerprint: None,
        session_id: None,
        user_agent_hash: None,
        schema_version: 1,
        computation: ComputationMeta { compute_time_ms: 1, cache_hit: true, data_freshness_minutes: 0 },
    }
}

/// Scenario 1: low-risk mobile transaction should produce a low rules score
/// and a calibrated score comfortably below the hold threshold.
#[test]
fn scenario_one_low_risk_transaction_scores_low() {
    let features = feature_vector(120.0, 2, 0.3, 10.0, 0.1);
    let rules = rules_score(&features);
    let ensemble = weighted_ensemble(0.1, 0.1, rules, DEFAULT_ENSEMBLE_WEIGHTS).expect("valid weights");
    let calibrated = platt_calibrate(ensemble, DEFAULT_PLATT_PARAMS);
    assert!(calibrated < 0.70, "expected calibrated score below hold threshold, got {calibrated}");
}

/// Scenario 4 (high-risk block): a saturated rules score pushed through the
/// full ensemble and calibration path should land at or above the block
/// threshold.
#[test]
fn scenario_four_high_risk_transaction_scores_high() {
    let features = feature_vector(25_000.0, 20, 0.95, 2000.0, 0.9);
    let rules = rules_score(&features);
    assert!((rules - 1.0).abs() < 1e-9, "rules score should saturate at 1.0, got {rules}");
    let ensemble = weighted_ensemble(0.9, 0.9, rules, DEFAULT_ENSEMBLE_WEIGHTS).expect("valid weights");
    let calibrated = platt_calibrate(ensemble, DEFAULT_PLATT_PARAMS);
    assert!(calibrated >= 0.90, "expected calibrated score at/above block threshold, got {calibrated}");
}
