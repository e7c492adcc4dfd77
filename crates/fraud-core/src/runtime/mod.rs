// fraud-core/src/runtime/mod.rs
// ============================================================================
// Module: Runtime
// Description: Pure numeric functions and reference store implementations.
// Purpose: Group the score-path math and test/demo infrastructure.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Runtime holds the pipeline's pure, non-suspending numeric core (§5):
//! Haversine distance, EMA updates, ensemble weighting, Platt calibration,
//! PSI, Brier score, and the deterministic rules-score formula. It also
//! provides the in-memory `EntityStateStore` used by tests, examples, and
//! single-process demos.

pub mod brier;
pub mod calibration;
pub mod ema;
pub mod geo;
pub mod psi;
pub mod rules;
pub mod store;

pub use brier::BRIER_WINDOW;
pub use brier::BrierObservation;
pub use brier::brier_score;
pub use brier::proxy_label;
pub use calibration::CalibrationError;
pub use calibration::DEFAULT_ENSEMBLE_WEIGHTS;
pub use calibration::DEFAULT_PLATT_PARAMS;
pub use calibration::EnsembleWeights;
pub use calibration::PlattParams;
pub use calibration::platt_calibrate;
pub use calibration::weighted_ensemble;
pub use ema::VELOCITY_EMA_ALPHA;
pub use ema::update_ema;
pub use geo::haversine_km;
pub use psi::PSI_BIN_COUNT;
pub use psi::PSI_MIN_OBSERVATIONS;
pub use psi::population_stability_index;
pub use rules::rules_attribution;
pub use rules::rules_score;
pub use store::InMemoryEntityStateStore;
pub use store::SharedEntityStateStore;
