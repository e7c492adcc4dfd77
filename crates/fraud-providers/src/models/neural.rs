// fraud-providers/src/models/neural.rs
// ============================================================================
// Module: Neural Model Stand-In
// Description: Fixed-weight feed-forward network implementing ScoreModel.
// Purpose: Exercise the ensemble's "neural" slot without a trained artifact
//          or an inference runtime dependency.
// Dependencies: fraud-core, super::{numeric_slice}
// ============================================================================

use fraud_core::Explanation;
use fraud_core::FeatureVector;
use fraud_core::ModelVersion;
use fraud_core::ScoreModel;
use fraud_core::rules_attribution;

use super::numeric_slice;

const NEUTRAL_SCORE: f64 = 0.1;
const INPUT_FEATURES: usize = 6;
const HIDDEN_UNITS: usize = 4;

/// Per-feature standardization applied before the hidden layer. Means and
/// standard deviations are fixed estimates of the feature engine's typical
/// ranges, not fit from data this workspace carries.
struct Scaler {
    mean: [f64; INPUT_FEATURES],
    std_dev: [f64; INPUT_FEATURES],
}

/// Order matches [`numeric_slice`]: amount, velocity_1h, ip_risk,
/// merchant_risk, geo_distance_km, account_age_days.
const DEFAULT_SCALER: Scaler = Scaler {
    mean: [500.0, 2.0, 0.2, 0.1, 50.0, 400.0],
    std_dev: [1500.0, 3.0, 0.25, 0.15, 200.0, 300.0],
};

/// A two-layer feed-forward network: one `tanh` hidden layer, one sigmoid
/// output unit.
struct Weights {
    hidden: [[f64; INPUT_FEATURES]; HIDDEN_UNITS],
    hidden_bias: [f64; HIDDEN_UNITS],
    output: [f64; HIDDEN_UNITS],
    output_bias: f64,
}

/// Fixed weights tuned so that the high-risk corners of the standardized
/// input space saturate toward `1.0` and the origin sits near `0.0`.
const DEFAULT_WEIGHTS: Weights = Weights {
    hidden: [
        [0.9, 0.6, 0.5, 0.3, 0.4, -0.2],
        [0.5, 0.8, 0.3, 0.2, 0.6, -0.1],
        [0.3, 0.3, 0.9, 0.4, 0.2, -0.3],
        [0.2, 0.4, 0.4, 0.7, 0.3, -0.5],
    ],
    hidden_bias: [-0.2, -0.3, -0.2, -0.1],
    output: [0.7, 0.6, 0.5, 0.4],
    output_bias: -0.8,
};

/// Fixed-weight feed-forward network standing in for a trained neural
/// model (§4.3).
///
/// [`Self::explain`] always falls back to [`rules_attribution`] — a
/// standardized dense network has no per-feature attribution this stand-in
/// can derive honestly, and §4.3 names the deterministic rule-predicate
/// proxy as the explicit substitute for exactly this case.
pub struct NeuralModel {
    version: ModelVersion,
    weights: Option<&'static Weights>,
    scaler: &'static Scaler,
}

impl NeuralModel {
    /// The stand-in's version tag when weights are loaded.
    pub const LOADED_VERSION: &'static str = "nn-ff-v1";
    /// The version tag reported when no weights are loaded.
    pub const DEGRADED_VERSION: &'static str = "degraded";

    /// Builds a model with the fixed weight matrices loaded.
    #[must_use]
    pub fn loaded() -> Self {
        Self {
            version: ModelVersion::new(Self::LOADED_VERSION),
            weights: Some(&DEFAULT_WEIGHTS),
            scaler: &DEFAULT_SCALER,
        }
    }

    /// Builds a model with no weights loaded; always scores neutral.
    #[must_use]
    pub fn degraded() -> Self {
        Self { version: ModelVersion::new(Self::DEGRADED_VERSION), weights: None, scaler: &DEFAULT_SCALER }
    }
}

impl ScoreModel for NeuralModel {
    fn version(&self) -> ModelVersion {
        self.version.clone()
    }

    fn score(&self, features: &FeatureVector) -> f64 {
        let Some(weights) = self.weights else {
            return NEUTRAL_SCORE;
        };
        let slice = numeric_slice(features);
        let standardized: [f64; INPUT_FEATURES] = std::array::from_fn(|i| {
            let std_dev = self.scaler.std_dev[i];
            if std_dev.abs() < f64::EPSILON { 0.0 } else { (slice[i].value - self.scaler.mean[i]) / std_dev }
        });
        let hidden: [f64; HIDDEN_UNITS] = std::array::from_fn(|h| {
            let sum: f64 = (0..INPUT_FEATURES).map(|i| weights.hidden[h][i] * standardized[i]).sum::<f64>()
                + weights.hidden_bias[h];
            sum.tanh()
        });
        let output_sum: f64 =
            (0..HIDDEN_UNITS).map(|h| weights.output[h] * hidden[h]).sum::<f64>() + weights.output_bias;
        (1.0 / (1.0 + (-output_sum).exp())).clamp(0.0, 1.0)
    }

    fn explain(&self, features: &FeatureVector) -> Explanation {
        rules_attribution(features)
    }
}
