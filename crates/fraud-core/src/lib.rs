// fraud-core/src/lib.rs
// ============================================================================
// Crate: fraud-core
// Description: Public API surface for the fraud decisioning pipeline's core.
// Purpose: Expose core types, backend interfaces, and pure runtime math.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! `fraud-core` provides the canonical data model (events, feature vectors,
//! model scores, decisions, evidence bundles, audit rows), typed identifiers,
//! canonical-JSON content hashing, and the backend-agnostic traits every
//! pipeline service programs against. It is intentionally free of any
//! specific broker, store, or model backend — those live in
//! `fraud-broker`, `fraud-store-sqlite`, and `fraud-providers`.

pub mod core;
pub mod interfaces;
pub mod runtime;

pub use core::Action;
pub use core::AuditIndexRow;
pub use core::Attribution;
pub use core::BundleId;
pub use core::CaseId;
pub use core::Channel;
pub use core::ClaimPayload;
pub use core::ClaimType;
pub use core::ComputationMeta;
pub use core::DEFAULT_HASH_ALGORITHM;
pub use core::DecisionId;
pub use core::DecisionOutput;
pub use core::DeviceFingerprint;
pub use core::EntityId;
pub use core::Event;
pub use core::EventId;
pub use core::EventPayload;
pub use core::EvidenceBundle;
pub use core::EvidenceType;
pub use core::Explanation;
pub use core::FEATURE_SCHEMA_VERSION;
pub use core::FeatureVector;
pub use core::GeoPlace;
pub use core::Geolocation;
pub use core::HashAlgorithm;
pub use core::HashDigest;
pub use core::HashError;
pub use core::MerchantId;
pub use core::ModelScores;
pub use core::ModelVersion;
pub use core::PolicyVersion;
pub use core::ScoreOutput;
pub use core::SessionId;
pub use core::Timestamp;
pub use core::TransactionPayload;
pub use core::VelocityCounts;
pub use interfaces::AccountAgeSource;
pub use interfaces::AuditIndexError;
pub use interfaces::AuditIndexStore;
pub use interfaces::AuditRowFilter;
pub use interfaces::BrokerError;
pub use interfaces::EmaWindow;
pub use interfaces::EntityStateStore;
pub use interfaces::EventConsumer;
pub use interfaces::EventPublisher;
pub use interfaces::GeoResolver;
pub use interfaces::IpRiskSource;
pub use interfaces::MerchantRiskSource;
pub use interfaces::ObjectStore;
pub use interfaces::ObjectStoreError;
pub use interfaces::ProviderError;
pub use interfaces::Record;
pub use interfaces::ScoreModel;
pub use interfaces::StoreError;
pub use interfaces::VelocityWindow;
pub use interfaces::WatchlistProvider;
pub use runtime::BRIER_WINDOW;
pub use runtime::BrierObservation;
pub use runtime::CalibrationError;
pub use runtime::DEFAULT_ENSEMBLE_WEIGHTS;
pub use runtime::DEFAULT_PLATT_PARAMS;
pub use runtime::EnsembleWeights;
pub use runtime::InMemoryEntityStateStore;
pub use runtime::PSI_BIN_COUNT;
pub use runtime::PSI_MIN_OBSERVATIONS;
pub use runtime::PlattParams;
pub use runtime::SharedEntityStateStore;
pub use runtime::VELOCITY_EMA_ALPHA;
pub use runtime::brier_score;
pub use runtime::haversine_km;
pub use runtime::platt_calibrate;
pub use runtime::population_stability_index;
pub use runtime::proxy_label;
pub use runtime::rules_attribution;
pub use runtime::rules_score;
pub use runtime::update_ema;
pub use runtime::weighted_ensemble;
