// fraud-ingest-svc/src/handlers.rs
// ============================================================================
// Module: Ingest HTTP Handlers
// Description: Request handlers for `POST /txn`, `POST /claim`, `GET /health`.
// Purpose: Validate, stamp, and publish events; never buffer on broker failure.
// Dependencies: axum, fraud-core, serde_json, tracing
// ============================================================================

//! ## Overview
//! Every handler follows the same shape: complete the request into an
//! `Event`, validate it, publish, respond. A validation failure short-circuits
//! before publish and returns the same JSON body for the same input every
//! time (§4.1). A publish failure is a transport failure (§7 Type 2): the
//! caller is the source of truth and is told to retry, nothing is buffered
//! in-process.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use fraud_core::Event;
use fraud_core::EventPublisher as _;
use fraud_core::Record;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use tracing::info;
use tracing::warn;

use crate::AppState;
use crate::ClaimRequest;
use crate::TransactionRequest;

/// Success body for an accepted event (§4.1 `{status, event_id}`).
#[derive(Debug, Serialize)]
struct Accepted {
    /// Always `"accepted"`.
    status: &'static str,
    /// The event identifier assigned or echoed back to the caller.
    event_id: String,
}

/// Publishes a validated event and turns the outcome into an HTTP response.
fn publish_event(state: &AppState, event: Event, topic: &str) -> Response {
    if let Err(reason) = event.validate() {
        warn!(event_id = %event.event_id, %reason, "ingest rejected event");
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "status": "rejected", "reason": reason })))
            .into_response();
    }

    let body = match serde_json::to_vec(&event) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(event_id = %event.event_id, %err, "failed to serialize event");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "status": "rejected", "reason": "event could not be serialized" })),
            )
                .into_response();
        }
    };

    let record = Record { key: event.entity_id.as_str().to_string(), value: body };
    match state.broker.publish(topic, record) {
        Ok(()) => {
            info!(event_id = %event.event_id, topic, "ingest published event");
            (StatusCode::OK, Json(Accepted { status: "accepted", event_id: event.event_id.to_string() }))
                .into_response()
        }
        Err(err) => {
            warn!(event_id = %event.event_id, topic, %err, "event log unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "error", "reason": err.to_string() })))
                .into_response()
        }
    }
}

/// Handles `POST /txn`.
pub async fn post_txn(State(state): State<Arc<AppState>>, Json(request): Json<TransactionRequest>) -> Response {
    let event = request.into_event();
    let topic = event.payload.topic();
    publish_event(&state, event, topic)
}

/// Handles `POST /claim`.
pub async fn post_claim(State(state): State<Arc<AppState>>, Json(request): Json<ClaimRequest>) -> Response {
    let event = request.into_event();
    let topic = event.payload.topic();
    publish_event(&state, event, topic)
}

/// Handles `GET /health`.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
