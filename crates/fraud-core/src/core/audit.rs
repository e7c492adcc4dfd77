// fraud-core/src/core/audit.rs
// ============================================================================
// Module: Audit Index Row
// Description: Queryable pointer from an audit operation to its evidence.
// Purpose: One append-only row per logical audit operation.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! One `AuditIndexRow` is appended per logical operation (§3). It is the
//! queryable half of the audit record; the evidence itself lives in the
//! content-addressed object store at `evidence_path` and hashes to
//! `evidence_hash`.

use serde::Deserialize;
use serde::Serialize;

use super::identifiers::EntityId;
use super::identifiers::EventId;
use super::time::Timestamp;

/// One append-only audit-index row (§3, §6 `audit_events` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditIndexRow {
    /// Event this row concerns.
    pub event_id: EventId,
    /// Free-form event/operation type label (e.g. `"decision"`, `"feature"`).
    pub event_type: String,
    /// Entity this row concerns.
    pub entity_id: EntityId,
    /// User or service account attributed to this operation, if any.
    pub user_id: Option<String>,
    /// Short action label (e.g. `"hold"`, `"persisted"`).
    pub action: String,
    /// Free-form details blob, never interpreted by the core.
    pub details: serde_json::Value,
    /// Lowercase hex SHA-256 digest of the evidence bundle's canonical payload.
    pub evidence_hash: String,
    /// Date-sharded object-store path, `YYYY/MM/DD/<uuid>.json`.
    pub evidence_path: String,
    /// When this row was appended.
    pub created_at: Timestamp,
}
