// fraud-core/src/interfaces/score_model.rs
// ============================================================================
// Module: Score Model
// Description: Backend-agnostic interface for the ensemble's sub-scorers.
// Purpose: Let the scorer service combine stand-in or real models uniformly.
// Dependencies: crate::core::features, crate::core::scores
// ============================================================================

//! ## Overview
//! `ScoreModel` is intentionally infallible: a missing or unloaded model is
//! not an error the scorer propagates — it is represented by an
//! implementation that always returns the documented neutral score (§7 type
//! 4 "Model-absent failure"). `fraud-providers` supplies the gradient-boosted,
//! neural, and rules implementations; tests can substitute a constant model.

use crate::core::features::FeatureVector;
use crate::core::identifiers::ModelVersion;
use crate::core::scores::Explanation;

/// A single sub-scorer feeding the weighted ensemble (§4.3).
pub trait ScoreModel {
    /// Returns the model version this instance represents; `"degraded"` for
    /// a stand-in that never had a real model loaded.
    fn version(&self) -> ModelVersion;

    /// Scores a feature vector, always returning a value in `[0, 1]`.
    fn score(&self, features: &FeatureVector) -> f64;

    /// Returns up to five attribution pairs for this score, sorted by
    /// absolute importance descending (§3, §4.3). Implementations without
    /// real attribution must fall back to a deterministic proxy rather than
    /// omit the field.
    fn explain(&self, features: &FeatureVector) -> Explanation;
}
