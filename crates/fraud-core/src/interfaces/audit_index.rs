// fraud-core/src/interfaces/audit_index.rs
// ============================================================================
// Module: Audit Index Store
// Description: Backend-agnostic interface to the append-only audit index.
// Purpose: Let the auditor persist/query rows without an SQL dependency here.
// Dependencies: crate::core::audit, thiserror
// ============================================================================

//! ## Overview
//! The audit index is append-only (§5) and queryable by event type, entity,
//! user, limit, and offset, ordered by `created_at` descending (§4.5
//! "Listing"). `fraud-store-sqlite::SqliteAuditIndexStore` is the durable
//! implementation of this trait.

use thiserror::Error;

use crate::core::audit::AuditIndexRow;
use crate::core::identifiers::EntityId;
use crate::core::identifiers::EventId;

/// Audit index store errors.
#[derive(Debug, Error)]
pub enum AuditIndexError {
    /// The index store is unreachable or the operation failed.
    #[error("audit index io error: {0}")]
    Io(String),
    /// A row referencing this event already exists with a different payload
    /// (the idempotence check at the audit layer, §3 "Lifecycle").
    #[error("conflicting audit row already recorded for event {0}")]
    Conflict(String),
}

/// Filter for [`AuditIndexStore::list`].
#[derive(Debug, Clone, Default)]
pub struct AuditRowFilter {
    /// Restrict to rows with this event type label.
    pub event_type: Option<String>,
    /// Restrict to rows for this entity.
    pub entity_id: Option<EntityId>,
    /// Restrict to rows attributed to this user/service account.
    pub user_id: Option<String>,
    /// Maximum number of rows to return.
    pub limit: u32,
    /// Number of matching rows to skip before collecting `limit`.
    pub offset: u32,
}

/// Append-only audit index (§3, §4.5, §6 `audit_events` table).
pub trait AuditIndexStore {
    /// Appends a new row. Implementations must reject a second append for
    /// the same `(event_id, event_type)` pair whose `evidence_hash` differs
    /// from the first (replay of an identical payload is idempotent; a
    /// genuinely different payload is a conflict).
    ///
    /// # Errors
    ///
    /// Returns [`AuditIndexError`] on I/O failure or a genuine conflict.
    fn append(&self, row: AuditIndexRow) -> Result<(), AuditIndexError>;

    /// Returns the most recently created row for `event_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AuditIndexError`] on I/O failure.
    fn latest_for_event(&self, event_id: &EventId) -> Result<Option<AuditIndexRow>, AuditIndexError>;

    /// Lists rows matching `filter`, ordered by `created_at` descending.
    ///
    /// # Errors
    ///
    /// Returns [`AuditIndexError`] on I/O failure.
    fn list(&self, filter: &AuditRowFilter) -> Result<Vec<AuditIndexRow>, AuditIndexError>;
}
