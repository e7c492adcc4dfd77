// fraud-scorer-svc/src/lib.rs
// ============================================================================
// Crate: fraud-scorer-svc
// Description: Produces a ModelScores object and explanation per feature
//              vector (§4.3).
// Purpose: Bridge the feature store to the alert stream: consume
//          features.online.v1, publish alerts.scores.v1.
// Dependencies: axum, fraud-broker, fraud-core, fraud-providers, tokio
// ============================================================================

//! ## Overview
//! [`ScoringEngine`] (in [`engine`]) holds all of §4.3's ensemble and
//! calibration logic. This crate wires it the same way `fraud-feature-svc`
//! wires its engine: [`run_consumer_loop`] polls `features.online.v1` and
//! publishes a [`ScoreOutput`] per vector to `alerts.scores.v1`, and
//! [`build_router`] exposes a synchronous `POST /score` path (§6) for one
//! feature vector at a time.

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
use fraud_core::EventConsumer as _;
use fraud_core::EventPublisher as _;
use fraud_core::FeatureVector;
use fraud_core::Record;
use fraud_core::ScoreOutput;
use serde_json::Value;
use serde_json::json;
use tracing::info;
use tracing::warn;

pub use engine::ScoringEngine;

/// Partition count for the topics this service produces and consumes.
const TOPIC_PARTITIONS: u32 = 4;
/// Topic this service consumes computed feature vectors from.
pub const FEATURE_TOPIC: &str = "features.online.v1";
/// Topic this service publishes computed scores to.
pub const SCORE_TOPIC: &str = "alerts.scores.v1";
/// Backoff between empty polls of the feature topic.
const POLL_BACKOFF: Duration = Duration::from_millis(50);

/// Shared application state: the broker handle and the scoring engine.
pub struct AppState {
    broker: InMemoryBroker,
    engine: ScoringEngine,
}

impl AppState {
    /// Builds application state over a fresh in-memory broker, registering
    /// the topics this service produces and consumes.
    #[must_use]
    pub fn new(engine: ScoringEngine) -> Self {
        let broker = InMemoryBroker::new([
            TopicConfig::new(FEATURE_TOPIC, TOPIC_PARTITIONS),
            TopicConfig::new(SCORE_TOPIC, TOPIC_PARTITIONS),
        ]);
        Self { broker, engine }
    }

    /// Builds application state over a caller-supplied broker, for wiring
    /// multiple services onto one shared event log in tests.
    #[must_use]
    pub fn with_broker(engine: ScoringEngine, broker: InMemoryBroker) -> Self {
        Self { broker, engine }
    }
}

/// Assembles the HTTP router: `POST /score`, `GET /health`.
#[must_use]
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new().route("/score", post(post_score)).route("/health", get(health)).with_state(state)
}

/// Handles `POST /score`: computes and returns a `ScoreOutput` for one
/// feature vector synchronously, without publishing anything (§6).
async fn post_score(State(state): State<Arc<AppState>>, Json(features): Json<FeatureVector>) -> Response {
    match state.engine.compute(&features) {
        Ok(output) => (StatusCode::OK, Json(output)).into_response(),
        Err(err) => {
            warn!(event_id = %features.event_id, %err, "scorer rejected misconfigured ensemble weights");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "status": "error", "reason": err.to_string() })))
                .into_response()
        }
    }
}

/// Handles `GET /health`.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Polls `features.online.v1` forever, computing and publishing a score per
/// feature vector. Runs until the process is terminated.
pub async fn run_consumer_loop(state: Arc<AppState>) {
    loop {
        if !poll_and_score(&state).await {
            tokio::time::sleep(POLL_BACKOFF).await;
        }
    }
}

/// Polls the feature topic once; returns whether a record was processed.
async fn poll_and_score(state: &Arc<AppState>) -> bool {
    let record = match state.broker.poll(FEATURE_TOPIC) {
        Ok(Some(record)) => record,
        Ok(None) => return false,
        Err(err) => {
            warn!(%err, "scorer poll failed");
            return false;
        }
    };
    process_record(state, &record);
    true
}

/// Decodes one feature-vector record, scores it, and publishes the result.
/// A record that fails to decode is logged and dropped (§7 Type 1).
fn process_record(state: &Arc<AppState>, record: &Record) {
    let features: FeatureVector = match serde_json::from_slice(&record.value) {
        Ok(features) => features,
        Err(err) => {
            warn!(%err, "dropping undecodable feature-vector record");
            return;
        }
    };
    let output: ScoreOutput = match state.engine.compute(&features) {
        Ok(output) => output,
        Err(err) => {
            warn!(event_id = %features.event_id, %err, "scorer rejected misconfigured ensemble weights");
            return;
        }
    };
    let body = match serde_json::to_vec(&output) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(event_id = %output.event_id, %err, "failed to serialize score output");
            return;
        }
    };
    let out = Record { key: features.entity_id.as_str().to_string(), value: body };
    match state.broker.publish(SCORE_TOPIC, out) {
        Ok(()) => info!(event_id = %output.event_id, "score published"),
        Err(err) => warn!(event_id = %output.event_id, %err, "failed to publish score"),
    }
}

#[cfg(test)]
mod tests {
    use fraud_core::DEFAULT_ENSEMBLE_WEIGHTS;
    use fraud_core::DEFAULT_PLATT_PARAMS;
    use fraud_providers::GradientBoostedModel;
    use fraud_providers::NeuralModel;
    use fraud_providers::RulesModel;
    use http_body_util::BodyExt as _;
    use tower::ServiceExt as _;

    use super::*;

    fn test_engine() -> ScoringEngine {
        ScoringEngine::new(
            Box::new(GradientBoostedModel::loaded()),
            Box::new(NeuralModel::loaded()),
            Box::new(RulesModel::new()),
            DEFAULT_ENSEMBLE_WEIGHTS,
            DEFAULT_PLATT_PARAMS,
        )
    }

    fn sample_features() -> FeatureVector {
        FeatureVector {
            event_id: fraud_core::EventId::new("evt-http"),
            entity_id: fraud_core::EntityId::new("ent-http"),
            computed_at: fraud_core::Timestamp::now(),
            amount: 15_000.0,
            currency: "USD".to_string(),
            channel: Some(fraud_core::Channel::Web),
            velocity: fraud_core::VelocityCounts { window_1h: 10, window_24h: 10, window_7d: 10 },
            ip_risk: 0.8,
            merchant_risk: 0.4,
            geolocation: None,
            geo_distance_km: 900.0,
            account_age_days: 5,
            device_fingerprint: None,
            session_id: None,
            user_agent_hash: None,
            schema_version: 1,
            computation: fraud_core::ComputationMeta { compute_time_ms: 0, cache_hit: true, data_freshness_minutes: 0 },
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.expect("collect body").to_bytes();
        serde_json::from_slice(&bytes).expect("parse body as json")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let router = build_router(Arc::new(AppState::new(test_engine())));
        let request = axum::http::Request::builder().uri("/health").body(axum::body::Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn score_returns_a_calibrated_score_without_publishing() {
        let router = build_router(Arc::new(AppState::new(test_engine())));
        let features = sample_features();
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/score")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(serde_json::to_vec(&features).unwrap()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let calibrated = body["scores"]["calibrated"].as_f64().expect("calibrated score present");
        assert!((0.0..=1.0).contains(&calibrated));
    }

    #[tokio::test]
    async fn consumer_loop_publishes_a_score_per_feature_vector() {
        let broker = InMemoryBroker::new([
            TopicConfig::new(FEATURE_TOPIC, TOPIC_PARTITIONS),
            TopicConfig::new(SCORE_TOPIC, TOPIC_PARTITIONS),
        ]);
        let state = Arc::new(AppState::with_broker(test_engine(), broker.clone()));

        let features = sample_features();
        let record =
            Record { key: features.entity_id.as_str().to_string(), value: serde_json::to_vec(&features).unwrap() };
        broker.publish(FEATURE_TOPIC, record).unwrap();

        assert!(poll_and_score(&state).await);

        let published = broker.poll(SCORE_TOPIC).unwrap().expect("a score was published");
        let output: ScoreOutput = serde_json::from_slice(&published.value).unwrap();
        assert_eq!(output.event_id, features.event_id);
    }
}
