// fraud-providers/src/models/gradient_boosted.rs
// ============================================================================
// Module: Gradient-Boosted Model Stand-In
// Description: Fixed threshold-stump ensemble implementing ScoreModel.
// Purpose: Exercise the ensemble's "tree model" slot without a trained
//          artifact.
// Dependencies: fraud-core, super::{numeric_slice}
// ============================================================================

use fraud_core::Attribution;
use fraud_core::Explanation;
use fraud_core::FeatureVector;
use fraud_core::ModelVersion;
use fraud_core::ScoreModel;
use fraud_core::rules_attribution;

use super::numeric_slice;

/// Score returned when no stump set is loaded (§7 type 4 "Model-absent
/// failure").
const NEUTRAL_SCORE: f64 = 0.1;

/// Whether a stump fires when its feature is above or below the threshold.
#[derive(Debug, Clone, Copy)]
enum Direction {
    Above,
    Below,
}

/// A single threshold rule with a fixed contribution weight, the gradient
/// boosted stand-in's unit of "tree".
#[derive(Debug, Clone, Copy)]
struct Stump {
    feature: &'static str,
    threshold: f64,
    weight: f64,
    direction: Direction,
}

impl Stump {
    const fn new(feature: &'static str, threshold: f64, weight: f64, direction: Direction) -> Self {
        Self { feature, threshold, weight, direction }
    }

    fn fires(&self, value: f64) -> bool {
        match self.direction {
            Direction::Above => value > self.threshold,
            Direction::Below => value < self.threshold,
        }
    }
}

/// Fixed stump set standing in for a trained gradient-boosted ensemble.
/// Weights sum to 1.0 so a feature vector that trips every stump scores at
/// the top of `[0, 1]`.
const DEFAULT_STUMPS: &[Stump] = &[
    Stump::new("amount", 10_000.0, 0.30, Direction::Above),
    Stump::new("velocity_1h", 8.0, 0.25, Direction::Above),
    Stump::new("ip_risk", 0.6, 0.20, Direction::Above),
    Stump::new("geo_distance_km", 750.0, 0.15, Direction::Above),
    Stump::new("merchant_risk", 0.6, 0.05, Direction::Above),
    Stump::new("account_age_days", 30.0, 0.05, Direction::Below),
];

/// Threshold-stump ensemble standing in for a trained gradient-boosted
/// model (§4.3).
///
/// [`Self::loaded`] evaluates [`DEFAULT_STUMPS`] against the feature vector;
/// [`Self::degraded`] carries no stumps and always returns the documented
/// neutral score, for exercising the model-absent failure mode.
#[derive(Debug, Clone)]
pub struct GradientBoostedModel {
    version: ModelVersion,
    stumps: &'static [Stump],
}

impl GradientBoostedModel {
    /// The stand-in's version tag when stumps are loaded.
    pub const LOADED_VERSION: &'static str = "gbm-stump-v1";
    /// The version tag reported when no stumps are loaded.
    pub const DEGRADED_VERSION: &'static str = "degraded";

    /// Builds a model with the fixed stump ensemble loaded.
    #[must_use]
    pub fn loaded() -> Self {
        Self { version: ModelVersion::new(Self::LOADED_VERSION), stumps: DEFAULT_STUMPS }
    }

    /// Builds a model with no stumps loaded; always scores neutral.
    #[must_use]
    pub fn degraded() -> Self {
        Self { version: ModelVersion::new(Self::DEGRADED_VERSION), stumps: &[] }
    }
}

impl ScoreModel for GradientBoostedModel {
    fn version(&self) -> ModelVersion {
        self.version.clone()
    }

    fn score(&self, features: &FeatureVector) -> f64 {
        if self.stumps.is_empty() {
            return NEUTRAL_SCORE;
        }
        let slice = numeric_slice(features);
        let raw: f64 = self
            .stumps
            .iter()
            .filter_map(|stump| {
                let value = slice.iter().find(|f| f.name == stump.feature)?.value;
                stump.fires(value).then_some(stump.weight)
            })
            .sum();
        raw.clamp(0.0, 1.0)
    }

    fn explain(&self, features: &FeatureVector) -> Explanation {
        if self.stumps.is_empty() {
            return rules_attribution(features);
        }
        let slice = numeric_slice(features);
        let mut contributions: Explanation = Explanation::new();
        for stump in self.stumps {
            let Some(value) = slice.iter().find(|f| f.name == stump.feature).map(|f| f.value) else {
                continue;
            };
            if stump.fires(value) {
                contributions
                    .push(Attribution { feature_name: stump.feature.to_string(), importance: stump.weight });
            }
        }
        contributions.sort_by(|a, b| b.importance.abs().total_cmp(&a.importance.abs()));
        contributions.truncate(5);
        contributions
    }
}
