// fraud-audit-svc/src/main.rs
// ============================================================================
// Binary: fraud-audit-svc
// Description: Process entry point for the audit and evidence service.
// ============================================================================

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use fraud_audit_svc::AppState;
use fraud_audit_svc::AuditEngine;
use fraud_audit_svc::build_router;
use fraud_config::ServiceConfig;
use fraud_store_sqlite::FsObjectStore;
use fraud_store_sqlite::SqliteAuditIndexStore;
use fraud_store_sqlite::SqliteStoreConfig;
use fraud_store_sqlite::SqliteStoreMode;
use fraud_store_sqlite::SqliteSyncMode;
use tracing_subscriber::EnvFilter;

/// Process entry point: loads configuration, opens the content-addressed
/// object store and the SQLite audit index, then serves the HTTP surface.
/// This service has no background consumer loop (see crate overview).
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

    let object_store = match FsObjectStore::new(&config.object_store.bucket) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(%err, "failed to open evidence object store");
            return ExitCode::FAILURE;
        }
    };

    let index_store = match SqliteAuditIndexStore::new(&SqliteStoreConfig {
        path: config.index_store.dsn.clone().into(),
        busy_timeout_ms: 5_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    }) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(%err, "failed to open audit index store");
            return ExitCode::FAILURE;
        }
    };

    let engine = AuditEngine::new(Box::new(object_store), Box::new(index_store));
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

    tracing::info!(%addr, "fraud-audit-svc listening");
    if let Err(err) = axum::serve(listener, router).await {
        tracing::error!(%err, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
