// fraud-decision-svc/src/main.rs
// ============================================================================
// Binary: fraud-decision-svc
// Description: Process entry point for the decision service.
// ============================================================================

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use fraud_config::Policy;
use fraud_config::PolicyStore;
use fraud_config::ServiceConfig;
use fraud_core::InMemoryEntityStateStore;
use fraud_core::PolicyVersion;
use fraud_core::SharedEntityStateStore;
use fraud_core::Timestamp;
use fraud_decision_svc::AppState;
use fraud_decision_svc::DecisionEngine;
use fraud_decision_svc::build_router;
use fraud_decision_svc::run_consumer_loop;
use fraud_providers::StaticWatchlistProvider;
use tracing_subscriber::EnvFilter;

/// Process entry point: loads configuration, seeds a baseline policy, and
/// serves both the background consumer loop and the synchronous test path.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ServiceConfig::load(None) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let policy = Policy::baseline(PolicyVersion::new("baseline"), Timestamp::now());
    if let Err(err) = policy.validate() {
        tracing::error!(%err, "baseline policy failed validation");
        return ExitCode::FAILURE;
    }

    let engine = DecisionEngine::new(
        PolicyStore::new(policy),
        SharedEntityStateStore::from_store(InMemoryEntityStateStore::new()),
        Arc::new(StaticWatchlistProvider::default()),
    );
    let state = Arc::new(AppState::new(engine));

    let addr_str = format!("{}:{}", config.server.bind.as_deref().unwrap_or("0.0.0.0"), config.server.port);
    let addr: SocketAddr = match addr_str.parse() {
        Ok(addr) => addr,
        Err(err) => {
            tracing::error!(%err, address = %addr_str, "invalid bind address");
            return ExitCode::FAILURE;
        }
    };

    let router = build_router(Arc::clone(&state));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%err, %addr, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    tokio::spawn(run_consumer_loop(state));

    tracing::info!(%addr, "fraud-decision-svc listening");
    if let Err(err) = axum::serve(listener, router).await {
        tracing::error!(%err, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
