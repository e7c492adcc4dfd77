// fraud-ingest-svc/src/main.rs
// ============================================================================
// Binary: fraud-ingest-svc
// Description: Process entry point for the ingest HTTP service.
// Purpose: Load configuration, bind the HTTP surface, serve until shutdown.
// Dependencies: axum, fraud-config, tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! Ingest has no state of its own beyond the broker handle, so startup is a
//! straight line: load configuration (refusing to start on an invalid or
//! missing config, §7 Type 6), register the topics this service owns, bind,
//! serve.

use std::net::SocketAddr;
use std::process::ExitCode;

use fraud_config::ServiceConfig;
use fraud_ingest_svc::AppState;
use fraud_ingest_svc::build_router;
use tracing_subscriber::EnvFilter;

/// Process entry point: loads configuration, binds, and serves.
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

    let addr: SocketAddr = match format!("{}:{}", config.server.bind.as_deref().unwrap_or("0.0.0.0"), config.server.port)
        .parse()
    {
        Ok(addr) => addr,
        Err(err) => {
            tracing::error!(%err, "invalid bind address");
            return ExitCode::FAILURE;
        }
    };

    let router = build_router(AppState::new());

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%err, %addr, "failed to bind ingest http listener");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%addr, "fraud-ingest-svc listening");
    if let Err(err) = axum::serve(listener, router).await {
        tracing::error!(%err, "ingest http server failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
