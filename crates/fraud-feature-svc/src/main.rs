// fraud-feature-svc/src/main.rs
// ============================================================================
// Binary: fraud-feature-svc
// Description: Process entry point for the feature engine service.
// ============================================================================

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use fraud_config::ServiceConfig;
use fraud_core::SharedEntityStateStore;
use fraud_core::InMemoryEntityStateStore;
use fraud_feature_svc::AppState;
use fraud_feature_svc::FeatureEngine;
use fraud_feature_svc::build_router;
use fraud_feature_svc::run_consumer_loop;
use fraud_providers::TableAccountAgeSource;
use fraud_providers::TableGeoResolver;
use fraud_providers::TableIpRiskSource;
use fraud_providers::TableMerchantRiskSource;
use tracing_subscriber::EnvFilter;

/// Process entry point: loads configuration, wires the feature engine, and
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

    let engine = FeatureEngine::new(
        SharedEntityStateStore::from_store(InMemoryEntityStateStore::new()),
        Arc::new(TableIpRiskSource::default()),
        Arc::new(TableMerchantRiskSource::default()),
        Arc::new(TableAccountAgeSource::default()),
        Arc::new(TableGeoResolver::default()),
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

    let router = build_router((*state).clone());
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%err, %addr, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    tokio::spawn(run_consumer_loop(state));

    tracing::info!(%addr, "fraud-feature-svc listening");
    if let Err(err) = axum::serve(listener, router).await {
        tracing::error!(%err, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
