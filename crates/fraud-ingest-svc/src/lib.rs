// fraud-ingest-svc/src/lib.rs
// ============================================================================
// Crate: fraud-ingest-svc
// Description: HTTP boundary accepting transaction/claim events.
// Purpose: Validate, identify, and publish inbound events to the event log.
// Dependencies: axum, fraud-broker, fraud-core, serde, serde_json, thiserror,
//               tracing
// ============================================================================

//! ## Overview
//! Ingest is the only stage callers talk to directly (§4.1). It owns no
//! per-entity state: every request is validated, stamped with an event id
//! and receive timestamp if the caller omitted them, and published
//! at-least-once to `events.txns.v1` or `events.claims.v1`, partitioned by
//! entity identifier. A validation failure never publishes and always
//! produces the same response for the same input (§4.1 "Rejections are
//! deterministic").

mod handlers;
mod requests;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use axum::routing::post;
use fraud_broker::InMemoryBroker;
use fraud_broker::TopicConfig;

pub use requests::ClaimRequest;
pub use requests::TransactionRequest;

/// Number of partitions ingest registers for each event topic.
///
/// An arbitrary small constant: this workspace's in-memory broker stands in
/// for a real partitioned log, and partition count only needs to be large
/// enough to exercise cross-partition independence in tests (§5).
pub const EVENT_TOPIC_PARTITIONS: u32 = 4;

/// Topic transaction events publish to (§6).
pub const TXN_TOPIC: &str = "events.txns.v1";

/// Topic claim events publish to (§6).
pub const CLAIM_TOPIC: &str = "events.claims.v1";

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Event-log publisher shared across all ingest workers.
    pub broker: InMemoryBroker,
}

impl AppState {
    /// Builds ingest's app state, pre-registering the transaction and claim
    /// topics on a fresh broker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            broker: InMemoryBroker::new([
                TopicConfig::new(TXN_TOPIC, EVENT_TOPIC_PARTITIONS),
                TopicConfig::new(CLAIM_TOPIC, EVENT_TOPIC_PARTITIONS),
            ]),
        }
    }

    /// Builds ingest's app state over an already-constructed broker, for
    /// services sharing one broker instance across process boundaries in
    /// tests.
    #[must_use]
    pub const fn with_broker(broker: InMemoryBroker) -> Self {
        Self { broker }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the ingest HTTP router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/txn", post(handlers::post_txn))
        .route("/claim", post(handlers::post_claim))
        .route("/health", get(handlers::health))
        .with_state(Arc::new(state))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use axum::http::StatusCode;
    use http_body_util::BodyExt as _;
    use tower::ServiceExt as _;

    use super::*;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.expect("collect body").to_bytes();
        serde_json::from_slice(&bytes).expect("body is json")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = build_router(AppState::new());
        let request = Request::builder().uri("/health").body(Body::empty()).expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn valid_transaction_is_accepted_and_assigned_an_event_id() {
        let app = build_router(AppState::new());
        let payload = serde_json::json!({
            "entity_id": "ent-1",
            "amount": 120.0,
            "currency": "USD",
            "channel": "mobile",
        });
        let request = Request::builder()
            .method("POST")
            .uri("/txn")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "accepted");
        assert!(body["event_id"].is_string());
    }

    #[tokio::test]
    async fn negative_amount_is_rejected_deterministically() {
        let app = build_router(AppState::new());
        let payload = serde_json::json!({
            "entity_id": "ent-1",
            "amount": -5.0,
            "currency": "USD",
            "channel": "web",
        });
        let first = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/txn")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(first.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let first_body = body_json(first).await;

        let second = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/txn")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        let second_body = body_json(second).await;
        assert_eq!(first_body, second_body);
    }

    #[tokio::test]
    async fn valid_claim_is_accepted() {
        let app = build_router(AppState::new());
        let payload = serde_json::json!({
            "entity_id": "ent-2",
            "amount": 800.0,
            "currency": "USD",
            "claim_type": "auto",
        });
        let request = Request::builder()
            .method("POST")
            .uri("/claim")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
