// fraud-decision-svc/src/lib.rs
// ============================================================================
// Crate: fraud-decision-svc
// Description: Evaluates policy rules and side-signal detectors against a
//              scored event, emitting a DecisionOutput (§4.4).
// Purpose: Bridge the score stream to the decision stream: consume
//          alerts.scores.v1 (joined with features.online.v1), publish
//          alerts.decisions.v1.
// Dependencies: axum, fraud-broker, fraud-config, fraud-core, tokio
// ============================================================================

//! ## Overview
//! [`DecisionEngine`] (in [`engine`]) holds §4.4's policy and override-rule
//! logic. The in-memory broker this workspace ships has no consumer-group
//! concept — each topic has exactly one shared poll cursor (see
//! `fraud-broker`'s module doc) — so this service cannot also read
//! `events.txns.v1`/`events.claims.v1` without stealing records
//! `fraud-feature-svc` needs; it only taps `features.online.v1` and
//! `alerts.scores.v1`, correlating the two by `event_id`. That means the
//! consumer-loop path never sees a raw source IP (only `fraud-ingest-svc`
//! does), so the IP-watchlist override never fires for broker-driven
//! decisions — an honest limitation of the single-process stand-in broker,
//! not a simplification of §4.4 itself. The synchronous `POST /decide` path
//! (§6) has no such gap: its caller supplies `ip_address` directly.

mod engine;
mod requests;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
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
use fraud_config::Policy;
use fraud_core::DecisionOutput;
use fraud_core::EventConsumer as _;
use fraud_core::EventId;
use fraud_core::EventPublisher as _;
use fraud_core::FeatureVector;
use fraud_core::Record;
use fraud_core::ScoreOutput;
use serde_json::Value;
use serde_json::json;
use tracing::info;
use tracing::warn;

pub use engine::DecisionContext;
pub use engine::DecisionEngine;
pub use requests::DecisionRequest;

/// Partition count for the topics this service produces and consumes.
const TOPIC_PARTITIONS: u32 = 4;
/// Topic this service consumes computed feature vectors from.
pub const FEATURE_TOPIC: &str = "features.online.v1";
/// Topic this service consumes computed scores from.
pub const SCORE_TOPIC: &str = "alerts.scores.v1";
/// Topic this service publishes decisions to.
pub const DECISION_TOPIC: &str = "alerts.decisions.v1";
/// Backoff between empty polls of the feature/score topics.
const POLL_BACKOFF: Duration = Duration::from_millis(50);

/// Feature vectors and scores awaiting their correlated counterpart,
/// keyed by `event_id`.
#[derive(Default)]
struct Correlator {
    features: HashMap<EventId, FeatureVector>,
    scores: HashMap<EventId, ScoreOutput>,
}

impl Correlator {
    /// Records a feature vector, returning its matching score if one is
    /// already waiting.
    fn offer_features(&mut self, features: FeatureVector) -> Option<(FeatureVector, ScoreOutput)> {
        if let Some(score) = self.scores.remove(&features.event_id) {
            return Some((features, score));
        }
        self.features.insert(features.event_id.clone(), features);
        None
    }

    /// Records a score, returning its matching feature vector if one is
    /// already waiting.
    fn offer_score(&mut self, score: ScoreOutput) -> Option<(FeatureVector, ScoreOutput)> {
        if let Some(features) = self.features.remove(&score.event_id) {
            return Some((features, score));
        }
        self.scores.insert(score.event_id.clone(), score);
        None
    }
}

/// Shared application state: the broker handle, decision engine, and the
/// feature/score correlator for the consumer loop.
pub struct AppState {
    broker: InMemoryBroker,
    engine: Arc<DecisionEngine>,
    correlator: Mutex<Correlator>,
}

impl AppState {
    /// Builds application state over a fresh in-memory broker, registering
    /// the topics this service produces and consumes.
    #[must_use]
    pub fn new(engine: DecisionEngine) -> Self {
        let broker = InMemoryBroker::new([
            TopicConfig::new(FEATURE_TOPIC, TOPIC_PARTITIONS),
            TopicConfig::new(SCORE_TOPIC, TOPIC_PARTITIONS),
            TopicConfig::new(DECISION_TOPIC, TOPIC_PARTITIONS),
        ]);
        Self { broker, engine: Arc::new(engine), correlator: Mutex::new(Correlator::default()) }
    }

    /// Builds application state over a caller-supplied broker, for wiring
    /// multiple services onto one shared event log in tests.
    #[must_use]
    pub fn with_broker(engine: DecisionEngine, broker: InMemoryBroker) -> Self {
        Self { broker, engine: Arc::new(engine), correlator: Mutex::new(Correlator::default()) }
    }
}

/// Assembles the HTTP router: `POST /decide`, `GET /policy`,
/// `POST /policy/reload`, `GET /health`.
#[must_use]
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/decide", post(post_decide))
        .route("/policy", get(get_policy))
        .route("/policy/reload", post(post_policy_reload))
        .route("/health", get(health))
        .with_state(state)
}

/// Handles `POST /decide`: produces a decision for one event synchronously,
/// without publishing anything (§6).
async fn post_decide(State(state): State<Arc<AppState>>, Json(request): Json<DecisionRequest>) -> Response {
    let context = request.into_context();
    match state.engine.decide(&context) {
        Ok(decision) => (StatusCode::OK, Json(decision)).into_response(),
        Err(err) => {
            warn!(event_id = %context.event_id, %err, "decision engine failed closed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "status": "error", "reason": err.to_string() })))
                .into_response()
        }
    }
}

/// Handles `GET /policy`: returns the currently active policy.
async fn get_policy(State(state): State<Arc<AppState>>) -> Json<Policy> {
    Json((*state.engine.current_policy()).clone())
}

/// Handles `POST /policy/reload`: atomically swaps in a new policy.
async fn post_policy_reload(State(state): State<Arc<AppState>>, Json(policy): Json<Policy>) -> Response {
    match state.engine.reload_policy(policy) {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "reloaded" }))).into_response(),
        Err(err) => {
            warn!(%err, "policy reload rejected");
            (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "status": "rejected", "reason": err.to_string() })))
                .into_response()
        }
    }
}

/// Handles `GET /health`.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Polls `features.online.v1`/`alerts.scores.v1` forever, correlating by
/// `event_id` and publishing a decision once both halves of a pair arrive.
pub async fn run_consumer_loop(state: Arc<AppState>) {
    loop {
        let features = poll_features(&state).await;
        let scores = poll_scores(&state).await;
        if !features && !scores {
            tokio::time::sleep(POLL_BACKOFF).await;
        }
    }
}

/// Polls the feature topic once; returns whether a record was processed.
async fn poll_features(state: &Arc<AppState>) -> bool {
    let record = match state.broker.poll(FEATURE_TOPIC) {
        Ok(Some(record)) => record,
        Ok(None) => return false,
        Err(err) => {
            warn!(%err, "decision service feature poll failed");
            return false;
        }
    };
    let features: FeatureVector = match serde_json::from_slice(&record.value) {
        Ok(features) => features,
        Err(err) => {
            warn!(%err, "dropping undecodable feature-vector record");
            return true;
        }
    };
    let pair = state.correlator.lock().unwrap_or_else(std::sync::PoisonError::into_inner).offer_features(features);
    if let Some((features, score)) = pair {
        emit_decision(state, features, score);
    }
    true
}

/// Polls the score topic once; returns whether a record was processed.
async fn poll_scores(state: &Arc<AppState>) -> bool {
    let record = match state.broker.poll(SCORE_TOPIC) {
        Ok(Some(record)) => record,
        Ok(None) => return false,
        Err(err) => {
            warn!(%err, "decision service score poll failed");
            return false;
        }
    };
    let score: ScoreOutput = match serde_json::from_slice(&record.value) {
        Ok(score) => score,
        Err(err) => {
            warn!(%err, "dropping undecodable score record");
            return true;
        }
    };
    let pair = state.correlator.lock().unwrap_or_else(std::sync::PoisonError::into_inner).offer_score(score);
    if let Some((features, score)) = pair {
        emit_decision(state, features, score);
    }
    true
}

/// Produces and publishes a decision for one correlated feature/score pair.
/// The consumer-loop path never carries a raw IP (see the module doc), so
/// `ip_address` is always `None` here.
fn emit_decision(state: &Arc<AppState>, features: FeatureVector, score: ScoreOutput) {
    let context = DecisionContext {
        event_id: features.event_id.clone(),
        entity_id: features.entity_id.clone(),
        calibrated: score.scores.calibrated,
        channel: features.channel,
        velocity_1h: features.velocity.window_1h,
        velocity_24h: features.velocity.window_24h,
        ip_risk: features.ip_risk,
        ip_address: None,
        device_fingerprint: features.device_fingerprint.clone(),
    };
    let decision: DecisionOutput = match state.engine.decide(&context) {
        Ok(decision) => decision,
        Err(err) => {
            warn!(event_id = %context.event_id, %err, "decision engine failed closed");
            return;
        }
    };
    let body = match serde_json::to_vec(&decision) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(event_id = %decision.event_id, %err, "failed to serialize decision");
            return;
        }
    };
    let out = Record { key: context.entity_id.as_str().to_string(), value: body };
    match state.broker.publish(DECISION_TOPIC, out) {
        Ok(()) => info!(event_id = %decision.event_id, action = ?decision.action, "decision published"),
        Err(err) => warn!(event_id = %decision.event_id, %err, "failed to publish decision"),
    }
}

#[cfg(test)]
mod tests {
    use fraud_config::PolicyStore;
    use fraud_core::EntityId;
    use fraud_core::InMemoryEntityStateStore;
    use fraud_core::ModelScores;
    use fraud_core::PolicyVersion;
    use fraud_core::SharedEntityStateStore;
    use fraud_core::Timestamp;
    use fraud_providers::StaticWatchlistProvider;
    use http_body_util::BodyExt as _;
    use tower::ServiceExt as _;

    use super::*;

    fn test_engine() -> DecisionEngine {
        DecisionEngine::new(
            PolicyStore::new(Policy::baseline(PolicyVersion::new("v1"), Timestamp::now())),
            SharedEntityStateStore::from_store(InMemoryEntityStateStore::new()),
            Arc::new(StaticWatchlistProvider::default()),
        )
    }

    fn sample_request() -> Value {
        json!({
            "event_id": "evt-http",
            "entity_id": "ent-http",
            "calibrated": 0.95,
            "channel": "web",
        })
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
    async fn decide_returns_a_blocking_decision_without_publishing() {
        let router = build_router(Arc::new(AppState::new(test_engine())));
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/decide")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(serde_json::to_vec(&sample_request()).unwrap()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["action"], "block");
        assert!(body["case_id"].is_string());
    }

    #[tokio::test]
    async fn policy_reload_is_reflected_in_get_policy() {
        let router = build_router(Arc::new(AppState::new(test_engine())));

        let mut reloaded = Policy::baseline(PolicyVersion::new("v2"), Timestamp::now());
        reloaded.hold_threshold = 0.5;
        reloaded.block_threshold = 0.6;
        let reload_request = axum::http::Request::builder()
            .method("POST")
            .uri("/policy/reload")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(serde_json::to_vec(&reloaded).unwrap()))
            .unwrap();
        let reload_response = router.clone().oneshot(reload_request).await.unwrap();
        assert_eq!(reload_response.status(), StatusCode::OK);

        let get_request =
            axum::http::Request::builder().uri("/policy").body(axum::body::Body::empty()).unwrap();
        let get_response = router.oneshot(get_request).await.unwrap();
        let body = body_json(get_response).await;
        assert_eq!(body["version"], "v2");
    }

    #[tokio::test]
    async fn consumer_loop_correlates_feature_and_score_records_by_event_id() {
        let broker = InMemoryBroker::new([
            TopicConfig::new(FEATURE_TOPIC, TOPIC_PARTITIONS),
            TopicConfig::new(SCORE_TOPIC, TOPIC_PARTITIONS),
            TopicConfig::new(DECISION_TOPIC, TOPIC_PARTITIONS),
        ]);
        let state = Arc::new(AppState::with_broker(test_engine(), broker.clone()));

        let features = FeatureVector {
            event_id: EventId::new("evt-corr"),
            entity_id: EntityId::new("ent-corr"),
            computed_at: Timestamp::now(),
            amount: 50.0,
            currency: "USD".to_string(),
            channel: Some(fraud_core::Channel::Mobile),
            velocity: fraud_core::VelocityCounts { window_1h: 1, window_24h: 1, window_7d: 1 },
            ip_risk: 0.05,
            merchant_risk: 0.0,
            geolocation: None,
            geo_distance_km: 0.0,
            account_age_days: 400,
            device_fingerprint: None,
            session_id: None,
            user_agent_hash: None,
            schema_version: 1,
            computation: fraud_core::ComputationMeta { compute_time_ms: 0, cache_hit: true, data_freshness_minutes: 0 },
        };
        let score = ScoreOutput {
            event_id: EventId::new("evt-corr"),
            scores: ModelScores { xgb: 0.1, nn: 0.1, rules: 0.1, ensemble: 0.1, calibrated: 0.1 },
            explain: fraud_core::Explanation::new(),
            model_version: fraud_core::ModelVersion::new("test"),
            computation_time_ms: 0,
        };

        broker
            .publish(
                FEATURE_TOPIC,
                Record { key: "ent-corr".to_string(), value: serde_json::to_vec(&features).unwrap() },
            )
            .unwrap();
        broker
            .publish(
                SCORE_TOPIC,
                Record { key: "ent-corr".to_string(), value: serde_json::to_vec(&score).unwrap() },
            )
            .unwrap();

        assert!(poll_features(&state).await);
        assert!(poll_scores(&state).await);

        let published = broker.poll(DECISION_TOPIC).unwrap().expect("a decision was published");
        let decision: DecisionOutput = serde_json::from_slice(&published.value).unwrap();
        assert_eq!(decision.event_id.as_str(), "evt-corr");
        assert_eq!(decision.action, fraud_core::Action::Allow);
    }
}
