// fraud-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Audit Index Store
// Description: Durable AuditIndexStore backed by SQLite WAL, plus the
//              model_metrics/feature_drift/decision_policy side tables.
// Purpose: Give the auditor and monitor durable, queryable persistence.
// Dependencies: fraud-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `audit_events` is append-only and backs [`fraud_core::AuditIndexStore`]
//! (§3, §6). `model_metrics` and `feature_drift` are written by the monitor
//! and read back for dashboards; `decision_policy` is written on every
//! accepted policy reload and read on service start so a restarted decision
//! service resumes the last active policy rather than the baked-in baseline.
//! The active policy is the row with `is_active = 1` and the most recent
//! `effective_date` (§6).

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use fraud_core::AuditIndexError;
use fraud_core::AuditIndexRow;
use fraud_core::AuditIndexStore;
use fraud_core::AuditRowFilter;
use fraud_core::EntityId;
use fraud_core::EventId;
use fraud_core::PolicyVersion;
use fraud_core::Timestamp;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum `details`/`metadata` JSON payload size accepted by the store.
pub const MAX_DETAILS_BYTES: usize = 256 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` audit index store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or a constraint the store itself is supposed to enforce.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// A row referencing the same event already exists with a different payload.
    #[error("conflicting audit row already recorded for event {0}")]
    Conflict(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for AuditIndexError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Conflict(event_id) => Self::Conflict(event_id),
            other => Self::Io(other.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Side-table rows
// ============================================================================

/// One `model_metrics` row (§6): a point-in-time model quality observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetricRow {
    /// Model this metric concerns, e.g. `"gradient_boosted"` or `"ensemble"`.
    pub model_name: String,
    /// Metric kind, e.g. `"brier"` or `"psi"`.
    pub metric_type: String,
    /// Observed metric value.
    pub metric_value: f64,
    /// Free-form metadata, e.g. `{"proxy_label": true}`.
    pub metadata: serde_json::Value,
    /// When this observation was recorded.
    pub created_at: Timestamp,
}

/// One `feature_drift` row (§6): a population-stability observation for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDriftRow {
    /// Feature this drift observation concerns.
    pub feature_name: String,
    /// Computed population stability index.
    pub psi_value: f64,
    /// Start of the reference period the current period is compared against.
    pub reference_period_start: Timestamp,
    /// End of the reference period.
    pub reference_period_end: Timestamp,
    /// Start of the current observation period.
    pub current_period_start: Timestamp,
    /// End of the current observation period.
    pub current_period_end: Timestamp,
    /// When this observation was recorded.
    pub created_at: Timestamp,
}

/// One `decision_policy` row (§6): a persisted, versioned policy snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecordRow {
    /// Serialized `fraud_config::Policy` payload.
    pub policy_config: serde_json::Value,
    /// Policy version tag.
    pub version: PolicyVersion,
    /// Whether this row is the active policy.
    pub is_active: bool,
    /// When this policy snapshot took effect.
    pub effective_date: Timestamp,
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed audit index store with WAL support.
///
/// Also owns the `model_metrics`, `feature_drift`, and `decision_policy`
/// side tables from §6, which are outside `fraud_core::AuditIndexStore`'s
/// trait surface (monitor- and decision-service concerns, not the auditor's)
/// but share the same durable connection.
#[derive(Clone)]
pub struct SqliteAuditIndexStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteAuditIndexStore {
    /// Opens a `SQLite`-backed audit index store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }

    /// Records a model metric observation.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on I/O or serialization failure.
    pub fn record_model_metric(&self, row: &ModelMetricRow) -> Result<(), SqliteStoreError> {
        let metadata = encode_json(&row.metadata)?;
        let guard = self.connection.lock().map_err(|_| poisoned())?;
        guard
            .execute(
                "INSERT INTO model_metrics (
                    model_name, metric_type, metric_value, metadata, created_at, created_at_ns
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    row.model_name,
                    row.metric_type,
                    row.metric_value,
                    metadata,
                    row.created_at.to_string(),
                    sort_key(row.created_at)
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Lists the most recent observations for `model_name`/`metric_type`,
    /// newest first, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on I/O or deserialization failure.
    pub fn list_model_metrics(
        &self,
        model_name: &str,
        metric_type: &str,
        limit: u32,
    ) -> Result<Vec<ModelMetricRow>, SqliteStoreError> {
        let guard = self.connection.lock().map_err(|_| poisoned())?;
        let mut stmt = guard
            .prepare(
                "SELECT model_name, metric_type, metric_value, metadata, created_at \
                 FROM model_metrics WHERE model_name = ?1 AND metric_type = ?2 \
                 ORDER BY created_at_ns DESC LIMIT ?3",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = stmt
            .query_map(params![model_name, metric_type, i64::from(limit)], map_model_metric_row)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        rows.map(|row| row.map_err(|err| SqliteStoreError::Db(err.to_string())).and_then(|r| r))
            .collect()
    }

    /// Records a feature drift observation.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on I/O failure.
    pub fn record_feature_drift(&self, row: &FeatureDriftRow) -> Result<(), SqliteStoreError> {
        let guard = self.connection.lock().map_err(|_| poisoned())?;
        guard
            .execute(
                "INSERT INTO feature_drift (
                    feature_name, psi_value, reference_period_start, reference_period_end,
                    current_period_start, current_period_end, created_at, created_at_ns
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    row.feature_name,
                    row.psi_value,
                    row.reference_period_start.to_string(),
                    row.reference_period_end.to_string(),
                    row.current_period_start.to_string(),
                    row.current_period_end.to_string(),
                    row.created_at.to_string(),
                    sort_key(row.created_at)
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Lists the most recent drift observations for `feature_name`, newest
    /// first, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on I/O or deserialization failure.
    pub fn list_feature_drift(
        &self,
        feature_name: &str,
        limit: u32,
    ) -> Result<Vec<FeatureDriftRow>, SqliteStoreError> {
        let guard = self.connection.lock().map_err(|_| poisoned())?;
        let mut stmt = guard
            .prepare(
                "SELECT feature_name, psi_value, reference_period_start, reference_period_end, \
                 current_period_start, current_period_end, created_at FROM feature_drift \
                 WHERE feature_name = ?1 ORDER BY created_at_ns DESC LIMIT ?2",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = stmt
            .query_map(params![feature_name, i64::from(limit)], map_feature_drift_row)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        rows.map(|row| row.map_err(|err| SqliteStoreError::Db(err.to_string())).and_then(|r| r))
            .collect()
    }

    /// Inserts a new policy snapshot and, if `is_active`, deactivates every
    /// other row so exactly one row has `is_active = 1` at a time.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on I/O or serialization failure.
    pub fn insert_policy_record(&self, row: &PolicyRecordRow) -> Result<(), SqliteStoreError> {
        let policy_config = encode_json(&row.policy_config)?;
        let mut guard = self.connection.lock().map_err(|_| poisoned())?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if row.is_active {
            tx.execute("UPDATE decision_policy SET is_active = 0", params![])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        tx.execute(
            "INSERT INTO decision_policy (
                policy_config, version, is_active, effective_date, effective_date_ns
             ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                policy_config,
                row.version.as_str(),
                row.is_active,
                row.effective_date.to_string(),
                sort_key(row.effective_date)
            ],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Returns the active policy: the row with `is_active = 1` and the most
    /// recent `effective_date` (§6).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on I/O or deserialization failure.
    pub fn active_policy(&self) -> Result<Option<PolicyRecordRow>, SqliteStoreError> {
        let guard = self.connection.lock().map_err(|_| poisoned())?;
        guard
            .query_row(
                "SELECT policy_config, version, is_active, effective_date FROM decision_policy \
                 WHERE is_active = 1 ORDER BY effective_date_ns DESC LIMIT 1",
                params![],
                map_policy_record_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?
            .transpose()
    }
}

impl AuditIndexStore for SqliteAuditIndexStore {
    fn append(&self, row: AuditIndexRow) -> Result<(), AuditIndexError> {
        self.append_row(&row).map_err(AuditIndexError::from)
    }

    fn latest_for_event(
        &self,
        event_id: &EventId,
    ) -> Result<Option<AuditIndexRow>, AuditIndexError> {
        self.latest_for_event_inner(event_id).map_err(AuditIndexError::from)
    }

    fn list(&self, filter: &AuditRowFilter) -> Result<Vec<AuditIndexRow>, AuditIndexError> {
        self.list_inner(filter).map_err(AuditIndexError::from)
    }
}

impl SqliteAuditIndexStore {
    /// Appends one audit row, rejecting a conflicting second append for the
    /// same `event_id`/`event_type` whose `evidence_hash` differs from the
    /// first (§3 idempotence).
    fn append_row(&self, row: &AuditIndexRow) -> Result<(), SqliteStoreError> {
        let details = encode_json(&row.details)?;
        let mut guard = self.connection.lock().map_err(|_| poisoned())?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let existing_hash: Option<String> = tx
            .query_row(
                "SELECT evidence_hash FROM audit_events WHERE event_id = ?1 AND event_type = ?2",
                params![row.event_id.as_str(), row.event_type],
                |r| r.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if let Some(existing_hash) = existing_hash {
            return if existing_hash == row.evidence_hash {
                Ok(())
            } else {
                Err(SqliteStoreError::Conflict(row.event_id.to_string()))
            };
        }
        tx.execute(
            "INSERT INTO audit_events (
                event_id, event_type, entity_id, user_id, action, details,
                evidence_hash, evidence_path, created_at, created_at_ns
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                row.event_id.as_str(),
                row.event_type,
                row.entity_id.as_str(),
                row.user_id,
                row.action,
                details,
                row.evidence_hash,
                row.evidence_path,
                row.created_at.to_string(),
                sort_key(row.created_at)
            ],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Returns the most recently created row for `event_id`, if any.
    fn latest_for_event_inner(
        &self,
        event_id: &EventId,
    ) -> Result<Option<AuditIndexRow>, SqliteStoreError> {
        let guard = self.connection.lock().map_err(|_| poisoned())?;
        guard
            .query_row(
                "SELECT event_id, event_type, entity_id, user_id, action, details, \
                 evidence_hash, evidence_path, created_at FROM audit_events \
                 WHERE event_id = ?1 ORDER BY created_at_ns DESC LIMIT 1",
                params![event_id.as_str()],
                map_audit_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?
            .transpose()
    }

    /// Lists rows matching `filter`, ordered by `created_at` descending.
    fn list_inner(&self, filter: &AuditRowFilter) -> Result<Vec<AuditIndexRow>, SqliteStoreError> {
        let limit = if filter.limit == 0 { 100 } else { i64::from(filter.limit) };
        let offset = i64::from(filter.offset);
        let guard = self.connection.lock().map_err(|_| poisoned())?;
        let mut stmt = guard
            .prepare(
                "SELECT event_id, event_type, entity_id, user_id, action, details, \
                 evidence_hash, evidence_path, created_at FROM audit_events \
                 WHERE (?1 IS NULL OR event_type = ?1) \
                   AND (?2 IS NULL OR entity_id = ?2) \
                   AND (?3 IS NULL OR user_id = ?3) \
                 ORDER BY created_at_ns DESC LIMIT ?4 OFFSET ?5",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let entity_id = filter.entity_id.as_ref().map(EntityId::as_str);
        let rows = stmt
            .query_map(
                params![filter.event_type, entity_id, filter.user_id, limit, offset],
                map_audit_row,
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        rows.map(|row| row.map_err(|err| SqliteStoreError::Db(err.to_string())).and_then(|r| r))
            .collect()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a poisoned-mutex error.
fn poisoned() -> SqliteStoreError {
    SqliteStoreError::Db("audit index store mutex poisoned".to_string())
}

/// Serializes and size-checks a JSON value before storing it as a blob.
fn encode_json(value: &serde_json::Value) -> Result<Vec<u8>, SqliteStoreError> {
    let bytes =
        serde_json::to_vec(value).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if bytes.len() > MAX_DETAILS_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_DETAILS_BYTES,
            actual_bytes: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens a `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates an existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS audit_events (
                    event_id TEXT NOT NULL,
                    event_type TEXT NOT NULL,
                    entity_id TEXT NOT NULL,
                    user_id TEXT,
                    action TEXT NOT NULL,
                    details BLOB NOT NULL,
                    evidence_hash TEXT NOT NULL,
                    evidence_path TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    created_at_ns INTEGER NOT NULL,
                    PRIMARY KEY (event_id, event_type)
                );
                CREATE INDEX IF NOT EXISTS idx_audit_events_entity
                    ON audit_events (entity_id, created_at_ns);
                CREATE INDEX IF NOT EXISTS idx_audit_events_created_at
                    ON audit_events (created_at_ns);
                CREATE TABLE IF NOT EXISTS model_metrics (
                    model_name TEXT NOT NULL,
                    metric_type TEXT NOT NULL,
                    metric_value REAL NOT NULL,
                    metadata BLOB NOT NULL,
                    created_at TEXT NOT NULL,
                    created_at_ns INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_model_metrics_lookup
                    ON model_metrics (model_name, metric_type, created_at_ns);
                CREATE TABLE IF NOT EXISTS feature_drift (
                    feature_name TEXT NOT NULL,
                    psi_value REAL NOT NULL,
                    reference_period_start TEXT NOT NULL,
                    reference_period_end TEXT NOT NULL,
                    current_period_start TEXT NOT NULL,
                    current_period_end TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    created_at_ns INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_feature_drift_lookup
                    ON feature_drift (feature_name, created_at_ns);
                CREATE TABLE IF NOT EXISTS decision_policy (
                    policy_config BLOB NOT NULL,
                    version TEXT NOT NULL,
                    is_active INTEGER NOT NULL,
                    effective_date TEXT NOT NULL,
                    effective_date_ns INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_decision_policy_active
                    ON decision_policy (is_active, effective_date_ns);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Maps a `SQLite` row into an [`AuditIndexRow`].
fn map_audit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<AuditIndexRow, SqliteStoreError>> {
    let event_id: String = row.get(0)?;
    let event_type: String = row.get(1)?;
    let entity_id: String = row.get(2)?;
    let user_id: Option<String> = row.get(3)?;
    let action: String = row.get(4)?;
    let details: Vec<u8> = row.get(5)?;
    let evidence_hash: String = row.get(6)?;
    let evidence_path: String = row.get(7)?;
    let created_at: String = row.get(8)?;
    Ok(decode_audit_row(
        event_id,
        event_type,
        entity_id,
        user_id,
        action,
        details,
        evidence_hash,
        evidence_path,
        created_at,
    ))
}

/// Decodes the raw column values fetched for an audit row into the typed form.
#[allow(clippy::too_many_arguments, reason = "mirrors a single wide audit_events row")]
fn decode_audit_row(
    event_id: String,
    event_type: String,
    entity_id: String,
    user_id: Option<String>,
    action: String,
    details: Vec<u8>,
    evidence_hash: String,
    evidence_path: String,
    created_at: String,
) -> Result<AuditIndexRow, SqliteStoreError> {
    let details = serde_json::from_slice(&details)
        .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    let created_at = parse_timestamp(&created_at)?;
    Ok(AuditIndexRow {
        event_id: EventId::new(event_id),
        event_type,
        entity_id: EntityId::new(entity_id),
        user_id,
        action,
        details,
        evidence_hash,
        evidence_path,
        created_at,
    })
}

/// Maps a `SQLite` row into a [`ModelMetricRow`].
fn map_model_metric_row(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<Result<ModelMetricRow, SqliteStoreError>> {
    let model_name: String = row.get(0)?;
    let metric_type: String = row.get(1)?;
    let metric_value: f64 = row.get(2)?;
    let metadata: Vec<u8> = row.get(3)?;
    let created_at: String = row.get(4)?;
    Ok((|| {
        Ok(ModelMetricRow {
            model_name,
            metric_type,
            metric_value,
            metadata: serde_json::from_slice(&metadata)
                .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?,
            created_at: parse_timestamp(&created_at)?,
        })
    })())
}

/// Maps a `SQLite` row into a [`FeatureDriftRow`].
fn map_feature_drift_row(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<Result<FeatureDriftRow, SqliteStoreError>> {
    let feature_name: String = row.get(0)?;
    let psi_value: f64 = row.get(1)?;
    let reference_period_start: String = row.get(2)?;
    let reference_period_end: String = row.get(3)?;
    let current_period_start: String = row.get(4)?;
    let current_period_end: String = row.get(5)?;
    let created_at: String = row.get(6)?;
    Ok((|| {
        Ok(FeatureDriftRow {
            feature_name,
            psi_value,
            reference_period_start: parse_timestamp(&reference_period_start)?,
            reference_period_end: parse_timestamp(&reference_period_end)?,
            current_period_start: parse_timestamp(&current_period_start)?,
            current_period_end: parse_timestamp(&current_period_end)?,
            created_at: parse_timestamp(&created_at)?,
        })
    })())
}

/// Maps a `SQLite` row into a [`PolicyRecordRow`].
fn map_policy_record_row(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<Result<PolicyRecordRow, SqliteStoreError>> {
    let policy_config: Vec<u8> = row.get(0)?;
    let version: String = row.get(1)?;
    let is_active: bool = row.get(2)?;
    let effective_date: String = row.get(3)?;
    Ok((|| {
        Ok(PolicyRecordRow {
            policy_config: serde_json::from_slice(&policy_config)
                .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?,
            version: PolicyVersion::new(version),
            is_active,
            effective_date: parse_timestamp(&effective_date)?,
        })
    })())
}

/// Parses an RFC 3339 timestamp string stored in a `TEXT` column.
fn parse_timestamp(value: &str) -> Result<Timestamp, SqliteStoreError> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|err| SqliteStoreError::Invalid(format!("invalid stored timestamp: {err}")))
}

/// Returns a nanosecond-since-epoch sort key for `ts`.
///
/// `ORDER BY` clauses use this integer column rather than the RFC 3339 text
/// column directly: `time::serde::rfc3339` trims trailing zero
/// sub-second digits, so two text timestamps do not always compare in
/// chronological order lexicographically.
fn sort_key(ts: Timestamp) -> i64 {
    i64::try_from(ts.into_inner().unix_timestamp_nanos()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, SqliteAuditIndexStore) {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("audit.db");
        let store = SqliteAuditIndexStore::new(&SqliteStoreConfig {
            path,
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::Wal,
            sync_mode: SqliteSyncMode::Full,
        })
        .expect("open store");
        (dir, store)
    }

    fn sample_row(event_id: &str, evidence_hash: &str) -> AuditIndexRow {
        AuditIndexRow {
            event_id: EventId::new(event_id),
            event_type: "decision".to_string(),
            entity_id: EntityId::new("entity-1"),
            user_id: Some("svc-decision".to_string()),
            action: "hold".to_string(),
            details: json!({"action": "hold"}),
            evidence_hash: evidence_hash.to_string(),
            evidence_path: "2024/03/05/abc.json".to_string(),
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn append_then_latest_round_trips() {
        let (_dir, store) = store();
        let row = sample_row("evt-1", "hash-a");
        store.append(row.clone()).expect("append");
        let fetched = store.latest_for_event(&EventId::new("evt-1")).expect("fetch");
        assert_eq!(fetched.expect("row present").evidence_hash, row.evidence_hash);
    }

    #[test]
    fn replaying_identical_payload_is_idempotent() {
        let (_dir, store) = store();
        let row = sample_row("evt-2", "hash-b");
        store.append(row.clone()).expect("first append");
        store.append(row).expect("replay append must succeed");
    }

    #[test]
    fn conflicting_replay_is_rejected() {
        let (_dir, store) = store();
        store.append(sample_row("evt-3", "hash-c")).expect("first append");
        let conflict = store.append(sample_row("evt-3", "hash-d"));
        assert!(matches!(conflict, Err(AuditIndexError::Conflict(_))));
    }

    #[test]
    fn list_filters_by_entity() {
        let (_dir, store) = store();
        store.append(sample_row("evt-4", "hash-e")).expect("append");
        let mut other = sample_row("evt-5", "hash-f");
        other.entity_id = EntityId::new("entity-2");
        store.append(other).expect("append");
        let filter =
            AuditRowFilter { entity_id: Some(EntityId::new("entity-1")), limit: 10, ..Default::default() };
        let rows = store.list(&filter).expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity_id.as_str(), "entity-1");
    }

    #[test]
    fn model_metrics_round_trip() {
        let (_dir, store) = store();
        let row = ModelMetricRow {
            model_name: "ensemble".to_string(),
            metric_type: "brier".to_string(),
            metric_value: 0.12,
            metadata: json!({"proxy_label": true}),
            created_at: Timestamp::now(),
        };
        store.record_model_metric(&row).expect("record");
        let rows = store.list_model_metrics("ensemble", "brier", 10).expect("list");
        assert_eq!(rows.len(), 1);
        assert!((rows[0].metric_value - 0.12).abs() < 1e-9);
    }

    #[test]
    fn feature_drift_round_trips() {
        let (_dir, store) = store();
        let now = Timestamp::now();
        let row = FeatureDriftRow {
            feature_name: "velocity_1h".to_string(),
            psi_value: 0.05,
            reference_period_start: now,
            reference_period_end: now,
            current_period_start: now,
            current_period_end: now,
            created_at: now,
        };
        store.record_feature_drift(&row).expect("record");
        let rows = store.list_feature_drift("velocity_1h", 10).expect("list");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn active_policy_picks_most_recent_effective_date() {
        let (_dir, store) = store();
        let older = Timestamp::now();
        store
            .insert_policy_record(&PolicyRecordRow {
                policy_config: json!({"version": "v1"}),
                version: PolicyVersion::new("v1"),
                is_active: true,
                effective_date: older,
            })
            .expect("insert v1");
        let newer = Timestamp::now();
        store
            .insert_policy_record(&PolicyRecordRow {
                policy_config: json!({"version": "v2"}),
                version: PolicyVersion::new("v2"),
                is_active: true,
                effective_date: newer,
            })
            .expect("insert v2");
        let active = store.active_policy().expect("active").expect("some row");
        assert_eq!(active.version.as_str(), "v2");
    }

    #[test]
    fn rejects_store_path_that_is_a_directory() {
        let dir = tempdir().expect("tempdir");
        let config = SqliteStoreConfig {
            path: dir.path().to_path_buf(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::Wal,
            sync_mode: SqliteSyncMode::Full,
        };
        assert!(SqliteAuditIndexStore::new(&config).is_err());
    }
}
