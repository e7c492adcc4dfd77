// fraud-core/src/interfaces/mod.rs
// ============================================================================
// Module: Interfaces
// Description: Backend-agnostic contracts the pipeline programs against.
// Purpose: Decouple services from specific brokers, stores, and models.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how this pipeline integrates with its external systems
//! (event log, key/value store, object store, audit index, model backends)
//! without embedding backend-specific details into the services themselves.
//! Implementations must be deterministic where determinism is required
//! (§7 "Idempotence") and fail closed on missing evidence.

pub mod audit_index;
pub mod broker;
pub mod object_store;
pub mod providers;
pub mod score_model;
pub mod store;

pub use audit_index::AuditIndexError;
pub use audit_index::AuditIndexStore;
pub use audit_index::AuditRowFilter;
pub use broker::BrokerError;
pub use broker::EventConsumer;
pub use broker::EventPublisher;
pub use broker::Record;
pub use object_store::ObjectStore;
pub use object_store::ObjectStoreError;
pub use providers::AccountAgeSource;
pub use providers::GeoResolver;
pub use providers::IpRiskSource;
pub use providers::MerchantRiskSource;
pub use providers::ProviderError;
pub use providers::WatchlistProvider;
pub use score_model::ScoreModel;
pub use store::EmaWindow;
pub use store::EntityStateStore;
pub use store::StoreError;
pub use store::VelocityWindow;
