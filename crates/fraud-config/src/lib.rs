// fraud-config/src/lib.rs
// ============================================================================
// Crate: fraud-config
// Description: Environment-driven service configuration and decision policy.
// Purpose: Single source of truth for fraud.toml semantics and Policy model.
// Dependencies: fraud-core, rule-logic, serde, toml
// ============================================================================

//! ## Overview
//! `fraud-config` defines the canonical configuration model for every
//! pipeline service. It provides strict, fail-closed validation and
//! deterministic generators for config schema, examples, and docs, plus the
//! versioned [`Policy`] model the decision engine evaluates and its
//! atomic-swap [`PolicyStore`] reload path.
//!
//! Security posture: config and policy inputs are untrusted; both fail
//! closed on malformed input rather than falling back to a permissive
//! default.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod docs;
pub mod examples;
pub mod policy;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use docs::config_docs_markdown;
pub use docs::verify_config_docs;
pub use docs::write_config_docs;
pub use examples::config_toml_example;
pub use fraud_core::DEFAULT_ENSEMBLE_WEIGHTS;
pub use fraud_core::DEFAULT_PLATT_PARAMS;
pub use fraud_core::EnsembleWeights;
pub use fraud_core::PlattParams;
pub use policy::*;
pub use schema::config_schema;
