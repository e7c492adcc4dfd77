// fraud-monitor-svc/src/lib.rs
// ============================================================================
// Crate: fraud-monitor-svc
// Description: Consumes scores, decisions, and feature vectors to compute
//              drift, calibration, throughput, and latency metrics (§4.6).
// Purpose: Off-hot-path observability: taps the same streams the pipeline
//          produces without sitting in any service's critical path.
// Dependencies: axum, fraud-broker, fraud-core, metrics,
//               metrics-exporter-prometheus, tokio
// ============================================================================

//! ## Overview
//! [`MonitorEngine`] (in [`engine`]) holds the rolling-buffer state. This
//! crate's [`run_consumer_loop`] polls `features.online.v1`,
//! `alerts.scores.v1`, and `alerts.decisions.v1` in round-robin, feeding
//! every record it can decode to the engine; decode failures are logged and
//! dropped, matching every other consumer loop in this workspace (§7 Type
//! 1). Observations are best-effort and unordered (§4.6 design note):
//! nothing here blocks or influences the hot path.
//!
//! `GET /metrics` renders the `metrics-exporter-prometheus` text
//! exposition; `GET /metrics/{calibration,drift,latency}` return the same
//! rolling state as structured JSON snapshots (§6).

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
use fraud_broker::InMemoryBroker;
use fraud_broker::TopicConfig;
use fraud_core::DecisionOutput;
use fraud_core::EventConsumer as _;
use fraud_core::FeatureVector;
use fraud_core::ScoreOutput;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use serde_json::json;
use tracing::warn;

pub use engine::CalibrationSnapshot;
pub use engine::DriftSnapshot;
pub use engine::LatencySnapshot;
pub use engine::MonitorEngine;

/// Partition count for the topics this service consumes.
const TOPIC_PARTITIONS: u32 = 4;
/// Topic carrying computed feature vectors.
pub const FEATURE_TOPIC: &str = "features.online.v1";
/// Topic carrying computed scores.
pub const SCORE_TOPIC: &str = "alerts.scores.v1";
/// Topic carrying final decisions.
pub const DECISION_TOPIC: &str = "alerts.decisions.v1";
/// Backoff between polling rounds that found no work on any topic.
const POLL_BACKOFF: Duration = Duration::from_millis(50);

/// Shared application state: the broker handle, the rolling-buffer engine,
/// and the installed Prometheus recorder handle.
pub struct AppState {
    broker: InMemoryBroker,
    engine: MonitorEngine,
    prometheus: PrometheusHandle,
}

impl AppState {
    /// Builds application state over a fresh in-memory broker, registering
    /// the topics this service consumes, and the given installed Prometheus
    /// recorder handle.
    #[must_use]
    pub fn new(prometheus: PrometheusHandle) -> Self {
        let broker = InMemoryBroker::new([
            TopicConfig::new(FEATURE_TOPIC, TOPIC_PARTITIONS),
            TopicConfig::new(SCORE_TOPIC, TOPIC_PARTITIONS),
            TopicConfig::new(DECISION_TOPIC, TOPIC_PARTITIONS),
        ]);
        Self { broker, engine: MonitorEngine::new(), prometheus }
    }

    /// Builds application state over a caller-supplied broker, for wiring
    /// multiple services onto one shared event log in tests.
    #[must_use]
    pub fn with_broker(broker: InMemoryBroker, prometheus: PrometheusHandle) -> Self {
        Self { broker, engine: MonitorEngine::new(), prometheus }
    }
}

/// Assembles the HTTP router: the pull-based metrics surface plus health.
#[must_use]
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route("/metrics/calibration", get(get_calibration))
        .route("/metrics/drift", get(get_drift))
        .route("/metrics/latency", get(get_latency))
        .route("/health", get(health))
        .with_state(state)
}

/// Handles `GET /metrics`: the Prometheus text exposition format.
async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    state.prometheus.render().into_response()
}

/// Handles `GET /metrics/calibration`.
async fn get_calibration(State(state): State<Arc<AppState>>) -> Json<CalibrationSnapshot> {
    Json(state.engine.calibration_snapshot())
}

/// Handles `GET /metrics/drift`.
async fn get_drift(State(state): State<Arc<AppState>>) -> Json<DriftSnapshot> {
    Json(state.engine.drift_snapshot())
}

/// Handles `GET /metrics/latency`.
async fn get_latency(State(state): State<Arc<AppState>>) -> Json<LatencySnapshot> {
    Json(state.engine.latency_snapshot())
}

/// Handles `GET /health`.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Polls all three tapped topics forever, feeding every decodable record to
/// the monitor engine. Runs until the process is terminated.
pub async fn run_consumer_loop(state: Arc<AppState>) {
    loop {
        let mut did_work = false;
        did_work |= poll_features(&state);
        did_work |= poll_scores(&state);
        did_work |= poll_decisions(&state);
        if !did_work {
            tokio::time::sleep(POLL_BACKOFF).await;
        }
    }
}

/// Polls `features.online.v1` once; returns whether a record was processed.
fn poll_features(state: &Arc<AppState>) -> bool {
    let record = match state.broker.poll(FEATURE_TOPIC) {
        Ok(Some(record)) => record,
        Ok(None) => return false,
        Err(err) => {
            warn!(%err, "monitor poll of feature topic failed");
            return false;
        }
    };
    match serde_json::from_slice::<FeatureVector>(&record.value) {
        Ok(features) => state.engine.observe_feature_vector(&features),
        Err(err) => warn!(%err, "dropping undecodable feature-vector record"),
    }
    true
}

/// Polls `alerts.scores.v1` once; returns whether a record was processed.
fn poll_scores(state: &Arc<AppState>) -> bool {
    let record = match state.broker.poll(SCORE_TOPIC) {
        Ok(Some(record)) => record,
        Ok(None) => return false,
        Err(err) => {
            warn!(%err, "monitor poll of score topic failed");
            return false;
        }
    };
    match serde_json::from_slice::<ScoreOutput>(&record.value) {
        Ok(score) => state.engine.observe_score(&score),
        Err(err) => warn!(%err, "dropping undecodable score record"),
    }
    true
}

/// Polls `alerts.decisions.v1` once; returns whether a record was processed.
fn poll_decisions(state: &Arc<AppState>) -> bool {
    let record = match state.broker.poll(DECISION_TOPIC) {
        Ok(Some(record)) => record,
        Ok(None) => return false,
        Err(err) => {
            warn!(%err, "monitor poll of decision topic failed");
            return false;
        }
    };
    match serde_json::from_slice::<DecisionOutput>(&record.value) {
        Ok(decision) => state.engine.observe_decision(&decision),
        Err(err) => warn!(%err, "dropping undecodable decision record"),
    }
    true
}
