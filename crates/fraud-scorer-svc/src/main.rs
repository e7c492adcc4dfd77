// fraud-scorer-svc/src/main.rs
// ============================================================================
// Binary: fraud-scorer-svc
// Description: Process entry point for the ensemble scoring service.
// ============================================================================

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use fraud_config::ServiceConfig;
use fraud_providers::GradientBoostedModel;
use fraud_providers::NeuralModel;
use fraud_providers::RulesModel;
use fraud_scorer_svc::AppState;
use fraud_scorer_svc::ScoringEngine;
use fraud_scorer_svc::build_router;
use fraud_scorer_svc::run_consumer_loop;
use tracing_subscriber::EnvFilter;

/// Process entry point: loads configuration, wires the scoring engine, and
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

    let weights = config.ensemble.into_weights();
    if let Err(err) = weights.validate() {
        tracing::error!(%err, "ensemble weights configuration is invalid");
        return ExitCode::FAILURE;
    }

    let engine = ScoringEngine::new(
        Box::new(GradientBoostedModel::loaded()),
        Box::new(NeuralModel::loaded()),
        Box::new(RulesModel::new()),
        weights,
        config.platt.into_params(),
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

    tracing::info!(%addr, "fraud-scorer-svc listening");
    if let Err(err) = axum::serve(listener, router).await {
        tracing::error!(%err, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
