// fraud-audit-svc/src/engine.rs
// ============================================================================
// Module: Audit Engine
// Description: Seals, persists, lists, and verifies evidence bundles.
// Purpose: The one writer of the content-addressed object store and the
//          append-only audit index (§4.5).
// Dependencies: fraud-core, fraud-store-sqlite
// ============================================================================

//! ## Overview
//! [`AuditEngine::record`] is §4.5's evidence write path end to end:
//! canonicalize the payload, hash it, write the canonical bytes to the
//! content-addressed object store at the date-sharded key, then append an
//! index row carrying that hash and path. If the object write succeeds but
//! the index insert fails, the object is orphaned rather than rolled back —
//! §3/§7 call this recoverable by a scan keyed on unreferenced objects, not
//! a transactional failure of the write path itself.
//!
//! [`AuditEngine::verify`] re-reads the object at the row's recorded path
//! and rehashes it, so an out-of-band mutation of the stored object is
//! detected even though the in-memory payload was never touched.

use fraud_core::AuditIndexError;
use fraud_core::AuditIndexRow;
use fraud_core::AuditIndexStore;
use fraud_core::AuditRowFilter;
use fraud_core::BundleId;
use fraud_core::EntityId;
use fraud_core::EvidenceBundle;
use fraud_core::EvidenceType;
use fraud_core::EventId;
use fraud_core::HashAlgorithm;
use fraud_core::HashError;
use fraud_core::ObjectStore;
use fraud_core::ObjectStoreError;
use fraud_core::Timestamp;
use fraud_core::core::hashing::canonical_json_bytes;
use fraud_core::core::hashing::hash_bytes;
use serde::Serialize;
use serde_json::Value;

/// Errors raised while recording or verifying an evidence bundle.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The payload could not be canonicalized or hashed.
    #[error("evidence hashing failed: {0}")]
    Hash(#[from] HashError),
    /// The object store rejected the write or read.
    #[error("object store error: {0}")]
    Object(#[from] ObjectStoreError),
    /// The audit index rejected the append, or the query failed.
    #[error("audit index error: {0}")]
    Index(#[from] AuditIndexError),
}

/// Result of `GET /audit/verify/{event_id}` (§6).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityStatus {
    /// The recomputed hash of the stored object matches the recorded hash.
    Verified,
    /// The recomputed hash differs from the recorded hash: the object was
    /// mutated out-of-band after it was written.
    Compromised,
    /// No audit row exists for this event.
    NoEvidence,
}

/// Response body for `GET /audit/verify/{event_id}`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyOutcome {
    /// Tri-state verification result.
    pub integrity_status: IntegrityStatus,
    /// Hash recomputed from the freshly re-read object, when one exists.
    pub calculated_hash: Option<String>,
    /// Hash recorded in the audit index at write time, when a row exists.
    pub stored_hash: Option<String>,
}

/// One evidence-record request: everything `AuditEngine::record` needs
/// beyond the payload itself.
#[derive(Debug, Clone)]
pub struct RecordRequest {
    /// Event this record concerns.
    pub event_id: EventId,
    /// What kind of record `payload` represents.
    pub evidence_type: EvidenceType,
    /// Free-form event/operation type label for the index row.
    pub event_type: String,
    /// Entity this record concerns.
    pub entity_id: EntityId,
    /// User or service account attributed to this operation, if any.
    pub user_id: Option<String>,
    /// Short action label (e.g. `"hold"`, `"persisted"`).
    pub action: String,
    /// Free-form details blob for the index row, never interpreted here.
    pub details: Value,
    /// The evidence payload itself, canonicalized and hashed.
    pub payload: Value,
}

/// Seals, persists, lists, and verifies evidence bundles (§4.5).
pub struct AuditEngine {
    object_store: Box<dyn ObjectStore + Send + Sync>,
    index_store: Box<dyn AuditIndexStore + Send + Sync>,
}

impl AuditEngine {
    /// Builds an audit engine over the given object and index stores.
    #[must_use]
    pub fn new(
        object_store: Box<dyn ObjectStore + Send + Sync>,
        index_store: Box<dyn AuditIndexStore + Send + Sync>,
    ) -> Self {
        Self { object_store, index_store }
    }

    /// Seals `request.payload` into an immutable [`EvidenceBundle`], writes
    /// its canonical bytes to the date-sharded object-store key, then
    /// appends the audit index row carrying the bundle's content hash.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if canonicalization, the object write, or the
    /// index append fails. A replay with an identical payload for the same
    /// `(event_id, event_type)` is idempotent (§3); a replay with a
    /// different payload is an [`AuditIndexError::Conflict`].
    pub fn record(&self, request: RecordRequest) -> Result<AuditIndexRow, AuditError> {
        let bundle = EvidenceBundle::seal(
            BundleId::generate(),
            request.event_id,
            request.evidence_type,
            request.payload,
            Timestamp::now(),
        )?;
        let canonical = canonical_json_bytes(&bundle.payload)?;
        let evidence_path =
            format!("{}/{}.json", bundle.created_at.date_prefix(), bundle.bundle_id.as_str());

        self.object_store.put(&evidence_path, &canonical)?;

        let row = AuditIndexRow {
            event_id: bundle.event_id,
            event_type: request.event_type,
            entity_id: request.entity_id,
            user_id: request.user_id,
            action: request.action,
            details: request.details,
            evidence_hash: bundle.content_hash.value,
            evidence_path,
            created_at: bundle.created_at,
        };
        self.index_store.append(row.clone())?;
        Ok(row)
    }

    /// Returns the most recently recorded row for `event_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] on an index-store failure.
    pub fn get(&self, event_id: &EventId) -> Result<Option<AuditIndexRow>, AuditError> {
        Ok(self.index_store.latest_for_event(event_id)?)
    }

    /// Lists rows matching `filter`, ordered by `created_at` descending (§4.5).
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] on an index-store failure.
    pub fn list(&self, filter: &AuditRowFilter) -> Result<Vec<AuditIndexRow>, AuditError> {
        Ok(self.index_store.list(filter)?)
    }

    /// Re-reads the object recorded for `event_id` and rehashes it,
    /// detecting any out-of-band mutation (§8 "Audit integrity").
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the index lookup fails, or if a row exists
    /// but its object cannot be read.
    pub fn verify(&self, event_id: &EventId) -> Result<VerifyOutcome, AuditError> {
        let Some(row) = self.index_store.latest_for_event(event_id)? else {
            return Ok(VerifyOutcome {
                integrity_status: IntegrityStatus::NoEvidence,
                calculated_hash: None,
                stored_hash: None,
            });
        };
        let bytes = self.object_store.get(&row.evidence_path)?;
        let calculated = hash_bytes(HashAlgorithm::Sha256, &bytes).value;
        let integrity_status = if calculated == row.evidence_hash {
            IntegrityStatus::Verified
        } else {
            IntegrityStatus::Compromised
        };
        Ok(VerifyOutcome {
            integrity_status,
            calculated_hash: Some(calculated),
            stored_hash: Some(row.evidence_hash),
        })
    }
}

#[cfg(test)]
mod tests {
    use fraud_store_sqlite::FsObjectStore;
    use fraud_store_sqlite::SqliteAuditIndexStore;
    use fraud_store_sqlite::SqliteStoreConfig;
    use fraud_store_sqlite::SqliteStoreMode;
    use fraud_store_sqlite::SqliteSyncMode;
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    fn engine(root: &std::path::Path, db: &std::path::Path) -> AuditEngine {
        let object_store = FsObjectStore::new(root).expect("open object store");
        let index_store = SqliteAuditIndexStore::new(&SqliteStoreConfig {
            path: db.to_path_buf(),
            busy_timeout_ms: 5_000,
            journal_mode: SqliteStoreMode::Wal,
            sync_mode: SqliteSyncMode::Full,
        })
        .expect("open index store");
        AuditEngine::new(Box::new(object_store), Box::new(index_store))
    }

    fn sample_request(event_id: &str) -> RecordRequest {
        RecordRequest {
            event_id: EventId::new(event_id),
            evidence_type: EvidenceType::Decision,
            event_type: "decision".to_string(),
            entity_id: EntityId::new("ent-1"),
            user_id: Some("svc-decision".to_string()),
            action: "hold".to_string(),
            details: json!({"action": "hold"}),
            payload: json!({"action": "hold", "risk": 0.42}),
        }
    }

    #[test]
    fn record_then_verify_reports_verified() {
        let dir = tempdir().expect("tempdir");
        let engine = engine(&dir.path().join("objects"), &dir.path().join("audit.db"));
        let row = engine.record(sample_request("evt-1")).expect("record");
        let outcome = engine.verify(&row.event_id).expect("verify");
        assert_eq!(outcome.integrity_status, IntegrityStatus::Verified);
        assert_eq!(outcome.calculated_hash, outcome.stored_hash);
    }

    #[test]
    fn verify_unknown_event_reports_no_evidence() {
        let dir = tempdir().expect("tempdir");
        let engine = engine(&dir.path().join("objects"), &dir.path().join("audit.db"));
        let outcome = engine.verify(&EventId::new("evt-missing")).expect("verify");
        assert_eq!(outcome.integrity_status, IntegrityStatus::NoEvidence);
    }

    #[test]
    fn out_of_band_object_mutation_is_detected() {
        let dir = tempdir().expect("tempdir");
        let objects_root = dir.path().join("objects");
        let engine = engine(&objects_root, &dir.path().join("audit.db"));
        let row = engine.record(sample_request("evt-2")).expect("record");

        std::fs::write(objects_root.join(&row.evidence_path), b"{\"tampered\":true}\n")
            .expect("tamper with the stored object");

        let outcome = engine.verify(&row.event_id).expect("verify");
        assert_eq!(outcome.integrity_status, IntegrityStatus::Compromised);
        assert_ne!(outcome.calculated_hash, outcome.stored_hash);
    }

    #[test]
    fn replaying_an_identical_payload_is_idempotent() {
        let dir = tempdir().expect("tempdir");
        let engine = engine(&dir.path().join("objects"), &dir.path().join("audit.db"));
        engine.record(sample_request("evt-3")).expect("first record");
        engine.record(sample_request("evt-3")).expect("replay must succeed");
    }

    #[test]
    fn list_filters_by_entity() {
        let dir = tempdir().expect("tempdir");
        let engine = engine(&dir.path().join("objects"), &dir.path().join("audit.db"));
        engine.record(sample_request("evt-4")).expect("record");
        let mut other = sample_request("evt-5");
        other.entity_id = EntityId::new("ent-2");
        engine.record(other).expect("record");

        let filter = AuditRowFilter { entity_id: Some(EntityId::new("ent-1")), limit: 10, ..Default::default() };
        let rows = engine.list(&filter).expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity_id.as_str(), "ent-1");
    }
}
