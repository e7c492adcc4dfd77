// fraud-feature-svc/src/lib.rs
// ============================================================================
// Crate: fraud-feature-svc
// Description: Derives a FeatureVector per event from the incoming payload
//              plus per-entity state (§4.2).
// Purpose: Bridge the event log to the feature store: consume
//          events.txns.v1/events.claims.v1, publish features.online.v1.
// Dependencies: axum, fraud-broker, fraud-core, fraud-providers, tokio
// ============================================================================

//! ## Overview
//! [`FeatureEngine`] (in [`engine`]) holds all of §4.2's computation. This
//! crate wires it two ways: [`run_consumer_loop`] polls the event-log topics
//! continuously and publishes a feature vector per event, and
//! [`build_router`] exposes a synchronous `POST /process` path (§6) that
//! computes and returns a feature vector for one event directly, without
//! touching the broker at all — useful for callers (and tests) that want a
//! feature vector without standing up the full pipeline.

mod engine;

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use fraud_broker::InMemoryBroker;
use fraud_broker::TopicConfig;
use fraud_core::Event;
use fraud_core::EventConsumer as _;
use fraud_core::EventPublisher as _;
use fraud_core::FeatureVector;
use fraud_core::Record;
use fraud_core::SharedEntityStateStore;
use serde_json::Value;
use serde_json::json;
use tracing::info;
use tracing::warn;

pub use engine::FeatureEngine;

/// Partition count for the topics this service produces and consumes.
const TOPIC_PARTITIONS: u32 = 4;
/// Event-log topic carrying transaction events.
pub const TXN_TOPIC: &str = "events.txns.v1";
/// Event-log topic carrying claim events.
pub const CLAIM_TOPIC: &str = "events.claims.v1";
/// Topic this service publishes computed feature vectors to.
pub const FEATURE_TOPIC: &str = "features.online.v1";
/// Backoff between empty polls of the event log.
const POLL_BACKOFF: Duration = Duration::from_millis(50);

/// Shared application state: the broker handle and the feature engine.
#[derive(Clone)]
pub struct AppState {
    broker: InMemoryBroker,
    engine: Arc<FeatureEngine>,
}

impl AppState {
    /// Builds application state over a fresh in-memory broker, registering
    /// the topics this service produces and consumes.
    #[must_use]
    pub fn new(engine: FeatureEngine) -> Self {
        let broker = InMemoryBroker::new([
            TopicConfig::new(TXN_TOPIC, TOPIC_PARTITIONS),
            TopicConfig::new(CLAIM_TOPIC, TOPIC_PARTITIONS),
            TopicConfig::new(FEATURE_TOPIC, TOPIC_PARTITIONS),
        ]);
        Self { broker, engine: Arc::new(engine) }
    }

    /// Builds application state over a caller-supplied broker, for wiring
    /// multiple services onto one shared event log in tests.
    #[must_use]
    pub fn with_broker(engine: FeatureEngine, broker: InMemoryBroker) -> Self {
        Self { broker, engine: Arc::new(engine) }
    }
}

/// Assembles the HTTP router: `POST /process`, `GET /health`.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/process", post(post_process))
        .route("/health", get(health))
        .with_state(Arc::new(state))
}

/// Handles `POST /process`: computes a feature vector for one event
/// synchronously and returns it, without publishing anything (§6).
async fn post_process(State(state): State<Arc<AppState>>, Json(event): Json<Event>) -> Response {
    if let Err(reason) = event.validate() {
        warn!(event_id = %event.event_id, %reason, "feature service rejected event");
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "status": "rejected", "reason": reason })))
            .into_response();
    }
    let vector = state.engine.compute(&event);
    (StatusCode::OK, Json(vector)).into_response()
}

/// Handles `GET /health`.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Polls `events.txns.v1`/`events.claims.v1` forever, computing and
/// publishing a feature vector per event. Runs until the process is
/// terminated; the caller typically spawns this as a background task.
pub async fn run_consumer_loop(state: Arc<AppState>) {
    loop {
        let txn = poll_and_process(&state, TXN_TOPIC).await;
        let claim = poll_and_process(&state, CLAIM_TOPIC).await;
        if !txn && !claim {
            tokio::time::sleep(POLL_BACKOFF).await;
        }
    }
}

/// Polls one topic once; returns whether a record was found and processed.
async fn poll_and_process(state: &Arc<AppState>, topic: &str) -> bool {
    let record = match state.broker.poll(topic) {
        Ok(Some(record)) => record,
        Ok(None) => return false,
        Err(err) => {
            warn!(topic, %err, "feature service poll failed");
            return false;
        }
    };
    process_record(state, &record);
    true
}

/// Decodes one event-log record, computes its feature vector, and publishes
/// it to [`FEATURE_TOPIC`]. Malformed records are logged and dropped (§7
/// Type 1): a feature vector is never fabricated for undecodable input.
fn process_record(state: &Arc<AppState>, record: &Record) {
    let event: Event = match serde_json::from_slice(&record.value) {
        Ok(event) => event,
        Err(err) => {
            warn!(%err, "dropping undecodable event-log record");
            return;
        }
    };
    let vector = state.engine.compute(&event);
    let body = match serde_json::to_vec(&vector) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(event_id = %vector.event_id, %err, "failed to serialize feature vector");
            return;
        }
    };
    let out = Record { key: vector.entity_id.as_str().to_string(), value: body };
    match state.broker.publish(FEATURE_TOPIC, out) {
        Ok(()) => info!(event_id = %vector.event_id, "feature vector published"),
        Err(err) => warn!(event_id = %vector.event_id, %err, "failed to publish feature vector"),
    }
}
