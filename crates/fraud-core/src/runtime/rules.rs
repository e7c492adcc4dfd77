// fraud-core/src/runtime/rules.rs
// ============================================================================
// Module: Rules Score
// Description: Deterministic weighted-predicate sum feeding the ensemble.
// Purpose: Pure s_r computation for the ensemble scorer's rules sub-score.
// Dependencies: crate::core::features
// ============================================================================

//! ## Overview
//! The shipped baseline rules score is a deterministic sum of weighted
//! predicates over a feature vector, clamped to `1.0` (§4.3). It is pure and
//! non-suspending, consistent with "Component internals... are pure and
//! non-suspending" (§5).

use crate::core::features::FeatureVector;
use crate::core::scores::Attribution;
use crate::core::scores::Explanation;

/// Computes the deterministic rules sub-score `s_r` for the ensemble (§4.3).
#[must_use]
pub fn rules_score(features: &FeatureVector) -> f64 {
    let mut score = 0.0;

    if features.amount > 10_000.0 {
        score += 0.3;
    }

    if features.velocity.window_1h > 10 {
        score += 0.4;
    } else if features.velocity.window_1h > 5 {
        score += 0.2;
    }

    if features.ip_risk > 0.8 {
        score += 0.3;
    } else if features.ip_risk > 0.5 {
        score += 0.1;
    }

    if features.geo_distance_km > 1000.0 {
        score += 0.2;
    } else if features.geo_distance_km > 500.0 {
        score += 0.1;
    }

    if features.merchant_risk > 0.7 {
        score += 0.2;
    }

    score.min(1.0)
}

/// Breaks `rules_score`'s contributions down by the feature each predicate
/// reads, for use as the deterministic explanation proxy §4.3 calls for when
/// a model has no real attribution of its own.
#[must_use]
pub fn rules_attribution(features: &FeatureVector) -> Explanation {
    let mut contributions: Explanation = Explanation::new();

    if features.amount > 10_000.0 {
        contributions.push(Attribution { feature_name: "amount".to_string(), importance: 0.3 });
    }

    let velocity_contribution = if features.velocity.window_1h > 10 {
        0.4
    } else if features.velocity.window_1h > 5 {
        0.2
    } else {
        0.0
    };
    if velocity_contribution > 0.0 {
        contributions.push(Attribution {
            feature_name: "velocity_1h".to_string(),
            importance: velocity_contribution,
        });
    }

    let ip_risk_contribution = if features.ip_risk > 0.8 {
        0.3
    } else if features.ip_risk > 0.5 {
        0.1
    } else {
        0.0
    };
    if ip_risk_contribution > 0.0 {
        contributions
            .push(Attribution { feature_name: "ip_risk".to_string(), importance: ip_risk_contribution });
    }

    let geo_contribution = if features.geo_distance_km > 1000.0 {
        0.2
    } else if features.geo_distance_km > 500.0 {
        0.1
    } else {
        0.0
    };
    if geo_contribution > 0.0 {
        contributions.push(Attribution {
            feature_name: "geo_distance_km".to_string(),
            importance: geo_contribution,
        });
    }

    if features.merchant_risk > 0.7 {
        contributions
            .push(Attribution { feature_name: "merchant_risk".to_string(), importance: 0.2 });
    }

    contributions.sort_by(|a, b| b.importance.abs().total_cmp(&a.importance.abs()));
    contributions.truncate(5);
    contributions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::Channel;
    use crate::core::features::ComputationMeta;
    use crate::core::features::VelocityCounts;
    use crate::core::identifiers::EntityId;
    use crate::core::identifiers::EventId;
    use crate::core::time::Timestamp;

    fn features_with(amount: f64, velocity_1h: u64, ip_risk: f64, geo_distance_km: f64, merchant_risk: f64) -> FeatureVector {
        FeatureVector {
            event_id: EventId::new("evt-1"),
            entity_id: EntityId::new("ent-1"),
            computed_at: Timestamp::now(),
            amount,
            currency: "USD".to_string(),
            channel: Some(Channel::Web),
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
            computation: ComputationMeta { compute_time_ms: 0, cache_hit: true, data_freshness_minutes: 0 },
        }
    }

    #[test]
    fn low_risk_features_score_zero() {
        let features = features_with(120.0, 2, 0.3, 10.0, 0.1);
        assert!((rules_score(&features)).abs() < 1e-9);
    }

    #[test]
    fn high_risk_features_clamp_to_one() {
        let features = features_with(20_000.0, 15, 0.95, 1200.0, 0.9);
        assert!((rules_score(&features) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn velocity_tier_applies_correct_weight() {
        let moderate = features_with(100.0, 7, 0.1, 0.0, 0.0);
        let high = features_with(100.0, 12, 0.1, 0.0, 0.0);
        assert!((rules_score(&moderate) - 0.2).abs() < 1e-9);
        assert!((rules_score(&high) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn attribution_is_empty_for_low_risk_features() {
        let features = features_with(120.0, 2, 0.3, 10.0, 0.1);
        assert!(rules_attribution(&features).is_empty());
    }

    #[test]
    fn attribution_lists_every_triggered_predicate_sorted_descending() {
        let features = features_with(20_000.0, 15, 0.95, 1200.0, 0.9);
        let attribution = rules_attribution(&features);
        assert_eq!(attribution.len(), 5);
        assert_eq!(attribution[0].feature_name, "velocity_1h");
        let mut previous = f64::INFINITY;
        for entry in &attribution {
            assert!(entry.importance.abs() <= previous);
            previous = entry.importance.abs();
        }
    }
}
