// fraud-monitor-svc/src/main.rs
// ============================================================================
// Binary: fraud-monitor-svc
// Description: Process entry point for the drift/calibration/latency
//              monitor.
// ============================================================================

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use fraud_config::ServiceConfig;
use fraud_monitor_svc::AppState;
use fraud_monitor_svc::build_router;
use fraud_monitor_svc::run_consumer_loop;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;

/// Process entry point: loads configuration, installs the process-global
/// Prometheus recorder, and serves the metrics surface alongside the
/// background consumer loop.
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

    let prometheus = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(err) => {
            tracing::error!(%err, "failed to install prometheus recorder");
            return ExitCode::FAILURE;
        }
    };

    let state = Arc::new(AppState::new(prometheus));

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

    tracing::info!(%addr, "fraud-monitor-svc listening");
    if let Err(err) = axum::serve(listener, router).await {
        tracing::error!(%err, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
