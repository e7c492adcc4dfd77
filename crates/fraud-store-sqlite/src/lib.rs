// fraud-store-sqlite/src/lib.rs
// ============================================================================
// Crate: fraud-store-sqlite
// Description: Durable SQLite audit index + filesystem evidence object store.
// Purpose: Give the auditor a real backend for fraud-core's storage traits.
// ============================================================================

//! ## Overview
//! Two backends live here:
//! [`SqliteAuditIndexStore`] implements `fraud_core::AuditIndexStore` over a
//! `SQLite` WAL database and additionally owns the `model_metrics`,
//! `feature_drift`, and `decision_policy` tables from the external interface
//! schema (§6); [`FsObjectStore`] implements `fraud_core::ObjectStore` as a
//! content-addressed filesystem tree.

mod object_store;
mod store;

pub use object_store::FsObjectStore;
pub use object_store::FsObjectStoreError;
pub use store::FeatureDriftRow;
pub use store::ModelMetricRow;
pub use store::PolicyRecordRow;
pub use store::SqliteAuditIndexStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
