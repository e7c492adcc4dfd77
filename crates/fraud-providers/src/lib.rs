// fraud-providers/src/lib.rs
// ============================================================================
// Crate: fraud-providers
// Description: Evidence sources and score models for the decisioning
//              pipeline.
// Purpose: Back fraud-core's provider and ScoreModel traits with
//          deterministic, config-loadable stand-ins.
// Dependencies: fraud-core
// ============================================================================

//! ## Overview
//! `fraud-providers` has two halves. [`sources`] supplies the five evidence
//! sources the feature engine (§4.2) and decision engine (§4.4) fall back to
//! on an `EntityStateStore` cache miss — each a plain lookup table with a
//! documented default, not a vendor API client. [`models`] supplies the three
//! `ScoreModel` sub-scorers the scorer service (§4.3) combines: a
//! gradient-boosted stump ensemble, a fixed-weight neural network, and the
//! deterministic rules baseline. This crate carries no network client and no
//! ensemble-combination logic of its own — weighting and Platt calibration
//! live in `fraud_core::runtime::calibration`.

mod models;
mod sources;

pub use models::GradientBoostedModel;
pub use models::NeuralModel;
pub use models::RulesModel;
pub use sources::DEFAULT_ACCOUNT_AGE_DAYS;
pub use sources::DEFAULT_IP_RISK;
pub use sources::DEFAULT_MERCHANT_RISK;
pub use sources::StaticWatchlistProvider;
pub use sources::TableAccountAgeSource;
pub use sources::TableGeoResolver;
pub use sources::TableIpRiskSource;
pub use sources::TableMerchantRiskSource;
