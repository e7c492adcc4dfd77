// fraud-audit-svc/src/lib.rs
// ============================================================================
// Crate: fraud-audit-svc
// Description: Persists and verifies immutable evidence bundles (§4.5).
// Purpose: The sole writer of the content-addressed object store and the
//          append-only audit index.
// Dependencies: axum, fraud-core, fraud-store-sqlite
// ============================================================================

//! ## Overview
//! Every other stage produces an audit record as a side effect of its own
//! work; per §9 ("no dependency cycle into the auditor"), none of them call
//! this service directly in the hot path — a service that wants a durable
//! audit trail posts to these endpoints the same way a test client would.
//! There is no dedicated audit topic in §6's topic list, so this service has
//! no background consumer loop: it is driven entirely by its HTTP surface.

mod engine;
mod requests;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use fraud_core::AuditRowFilter;
use fraud_core::EventId;
use fraud_core::EvidenceType;
use serde_json::json;

pub use engine::AuditEngine;
pub use engine::AuditError;
pub use engine::IntegrityStatus;
pub use engine::RecordRequest;
pub use engine::VerifyOutcome;
pub use requests::AuditListQuery;
pub use requests::AuditRecordBody;

/// Shared application state: the audit engine.
pub struct AppState {
    engine: AuditEngine,
}

impl AppState {
    /// Builds application state over the given audit engine.
    #[must_use]
    pub fn new(engine: AuditEngine) -> Self {
        Self { engine }
    }
}

/// Assembles the HTTP router: the five audit endpoints from §6 plus health.
#[must_use]
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/audit/event", post(post_audit_event))
        .route("/audit/decision", post(post_audit_decision))
        .route("/audit/case", post(post_audit_case))
        .route("/audit/{event_id}", get(get_audit_event))
        .route("/audit/events", get(list_audit_events))
        .route("/audit/verify/{event_id}", get(verify_audit_event))
        .route("/health", get(health))
        .with_state(state)
}

/// Handles `POST /audit/event`.
async fn post_audit_event(State(state): State<Arc<AppState>>, Json(body): Json<AuditRecordBody>) -> Response {
    record(&state, body.into_request(EvidenceType::AuditEvent, "event"))
}

/// Handles `POST /audit/decision`.
async fn post_audit_decision(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AuditRecordBody>,
) -> Response {
    record(&state, body.into_request(EvidenceType::Decision, "decision"))
}

/// Handles `POST /audit/case`.
async fn post_audit_case(State(state): State<Arc<AppState>>, Json(body): Json<AuditRecordBody>) -> Response {
    record(&state, body.into_request(EvidenceType::CaseEvent, "case"))
}

/// Records one evidence bundle and maps the outcome to an HTTP response.
fn record(state: &AppState, request: RecordRequest) -> Response {
    match state.engine.record(request) {
        Ok(row) => (StatusCode::CREATED, Json(row)).into_response(),
        Err(AuditError::Index(err)) => {
            tracing::warn!(%err, "audit record rejected");
            (StatusCode::CONFLICT, Json(json!({ "status": "conflict", "reason": err.to_string() })))
                .into_response()
        }
        Err(err) => {
            tracing::warn!(%err, "audit record failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "status": "error", "reason": err.to_string() })))
                .into_response()
        }
    }
}

/// Handles `GET /audit/{event_id}`.
async fn get_audit_event(State(state): State<Arc<AppState>>, Path(event_id): Path<String>) -> Response {
    match state.engine.get(&EventId::new(event_id)) {
        Ok(Some(row)) => (StatusCode::OK, Json(row)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({ "status": "not_found" }))).into_response(),
        Err(err) => {
            tracing::warn!(%err, "audit lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "status": "error", "reason": err.to_string() })))
                .into_response()
        }
    }
}

/// Handles `GET /audit/events?event_type=&entity_id=&user_id=&limit=&offset=`.
async fn list_audit_events(State(state): State<Arc<AppState>>, Query(query): Query<AuditListQuery>) -> Response {
    let filter = AuditRowFilter {
        event_type: query.event_type,
        entity_id: query.entity_id,
        user_id: query.user_id,
        limit: query.limit,
        offset: query.offset,
    };
    match state.engine.list(&filter) {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => {
            tracing::warn!(%err, "audit listing failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "status": "error", "reason": err.to_string() })))
                .into_response()
        }
    }
}

/// Handles `GET /audit/verify/{event_id}` → `{integrity_status, calculated_hash, stored_hash}`.
async fn verify_audit_event(State(state): State<Arc<AppState>>, Path(event_id): Path<String>) -> Response {
    match state.engine.verify(&EventId::new(event_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => {
            tracing::warn!(%err, "audit verification failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "status": "error", "reason": err.to_string() })))
                .into_response()
        }
    }
}

/// Handles `GET /health`.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
