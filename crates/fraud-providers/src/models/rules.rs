// fraud-providers/src/models/rules.rs
// ============================================================================
// Module: Rules Model
// Description: ScoreModel wrapper around fraud-core's deterministic rules
//              score.
// Purpose: Give the ensemble its baseline sub-scorer, the one model this
//          workspace ships with no "degraded" variant.
// Dependencies: fraud-core
// ============================================================================

use fraud_core::Explanation;
use fraud_core::FeatureVector;
use fraud_core::ModelVersion;
use fraud_core::ScoreModel;
use fraud_core::rules_attribution;
use fraud_core::rules_score;

/// Wraps `fraud_core::rules_score`/`rules_attribution` as the ensemble's
/// deterministic baseline sub-scorer (§4.3). Unlike the other two
/// sub-scorers, this model has no weights to lose, so it has no `degraded`
/// variant — the baseline is always available.
#[derive(Debug, Clone)]
pub struct RulesModel {
    version: ModelVersion,
}

impl RulesModel {
    /// This model's fixed version tag.
    pub const VERSION: &'static str = "rules-baseline-v1";

    /// Builds the rules baseline model.
    #[must_use]
    pub fn new() -> Self {
        Self { version: ModelVersion::new(Self::VERSION) }
    }
}

impl Default for RulesModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreModel for RulesModel {
    fn version(&self) -> ModelVersion {
        self.version.clone()
    }

    fn score(&self, features: &FeatureVector) -> f64 {
        rules_score(features)
    }

    fn explain(&self, features: &FeatureVector) -> Explanation {
        rules_attribution(features)
    }
}
