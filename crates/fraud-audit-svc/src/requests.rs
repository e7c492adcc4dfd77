// fraud-audit-svc/src/requests.rs
// ============================================================================
// Module: Audit Request DTOs
// Description: HTTP request bodies and query parameters for the audit API.
// Purpose: Translate §6's audit endpoints into engine::RecordRequest calls.
// Dependencies: fraud-core, serde
// ============================================================================

use fraud_core::EntityId;
use fraud_core::EventId;
use fraud_core::EvidenceType;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::engine::RecordRequest;

/// Request body shared by `POST /audit/event|decision|case`; the evidence
/// type and index `event_type` label are supplied by the route, not the body.
#[derive(Debug, Deserialize)]
pub struct AuditRecordBody {
    /// Event this record concerns.
    pub event_id: EventId,
    /// Entity this record concerns.
    pub entity_id: EntityId,
    /// User or service account attributed to this operation, if any.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Short action label (e.g. `"hold"`, `"persisted"`).
    pub action: String,
    /// Free-form details blob for the index row.
    #[serde(default)]
    pub details: Value,
    /// The evidence payload itself, canonicalized and hashed.
    pub payload: Value,
}

impl AuditRecordBody {
    /// Completes this body into a [`RecordRequest`] for the given route.
    #[must_use]
    pub fn into_request(self, evidence_type: EvidenceType, event_type: &str) -> RecordRequest {
        let details = if self.details.is_null() { json!({}) } else { self.details };
        RecordRequest {
            event_id: self.event_id,
            evidence_type,
            event_type: event_type.to_string(),
            entity_id: self.entity_id,
            user_id: self.user_id,
            action: self.action,
            details,
            payload: self.payload,
        }
    }
}

/// Query parameters for `GET /audit/events` (§4.5 "Listing").
#[derive(Debug, Deserialize)]
pub struct AuditListQuery {
    /// Restrict to rows with this event type label.
    #[serde(default)]
    pub event_type: Option<String>,
    /// Restrict to rows for this entity.
    #[serde(default)]
    pub entity_id: Option<EntityId>,
    /// Restrict to rows attributed to this user/service account.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Maximum number of rows to return.
    #[serde(default)]
    pub limit: u32,
    /// Number of matching rows to skip before collecting `limit`.
    #[serde(default)]
    pub offset: u32,
}
