// fraud-providers/src/models/mod.rs
// ============================================================================
// Module: Score Models
// Description: ScoreModel stand-ins for the ensemble's three sub-scorers.
// Purpose: Give the scorer service deterministic, config-free model backends.
// Dependencies: fraud-core
// ============================================================================

//! ## Overview
//! `GradientBoostedModel` and `NeuralModel` are fixed-weight stand-ins for a
//! trained model neither of which this workspace ships — each has a
//! `degraded()` constructor producing the documented neutral score (§7 type 4)
//! with no weights loaded, for exercising that failure mode without a real
//! artifact. `RulesModel` is the deterministic baseline and is never
//! "degraded" — it has no weights to lose.

mod gradient_boosted;
mod neural;
mod rules;

pub use gradient_boosted::GradientBoostedModel;
pub use neural::NeuralModel;
pub use rules::RulesModel;

use fraud_core::FeatureVector;

/// One numeric feature read by the stump and neural stand-ins, named for
/// attribution output.
pub(crate) struct NumericFeature {
    pub(crate) name: &'static str,
    pub(crate) value: f64,
}

/// The fixed, ordered numeric slice both stand-in models read from a
/// [`FeatureVector`]. Order matters: [`NeuralModel`]'s weight matrices index
/// into this slice positionally.
pub(crate) fn numeric_slice(features: &FeatureVector) -> [NumericFeature; 6] {
    #[allow(
        clippy::cast_precision_loss,
        reason = "velocity counts and account age in days never approach f64's 52-bit mantissa limit"
    )]
    let (velocity_1h, account_age_days) =
        (features.velocity.window_1h as f64, features.account_age_days as f64);
    [
        NumericFeature { name: "amount", value: features.amount },
        NumericFeature { name: "velocity_1h", value: velocity_1h },
        NumericFeature { name: "ip_risk", value: features.ip_risk },
        NumericFeature { name: "merchant_risk", value: features.merchant_risk },
        NumericFeature { name: "geo_distance_km", value: features.geo_distance_km },
        NumericFeature { name: "account_age_days", value: account_age_days },
    ]
}
