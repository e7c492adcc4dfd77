// fraud-config/src/config.rs
// ============================================================================
// Module: Service Configuration
// Description: Configuration loading and validation for pipeline services.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: fraud-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path
//! limits. Missing or invalid configuration fails closed: services refuse to
//! start (§7 Type 6, Configuration failure) rather than run with an
//! unvalidated or partially-defaulted config.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use fraud_core::Channel;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "fraud.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "FRAUD_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default per-service HTTP port.
pub(crate) const DEFAULT_PORT: u16 = 8080;
/// Default PSI alert threshold (a widely used population-drift rule of thumb).
pub(crate) const DEFAULT_PSI_ALERT_THRESHOLD: f64 = 0.2;
/// Default Brier-score alert threshold.
pub(crate) const DEFAULT_BRIER_ALERT_THRESHOLD: f64 = 0.25;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading or validating service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying filesystem error.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parse failure.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Semantic validation failure.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Top-level pipeline service configuration (§6 "Configuration (environment)").
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Event-log (broker) bootstrap configuration.
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Per-entity key/value state store configuration.
    #[serde(default)]
    pub entity_store: EntityStoreConfig,
    /// Evidence-bundle object store configuration.
    #[serde(default)]
    pub object_store: ObjectStoreConfig,
    /// Audit index store configuration.
    #[serde(default)]
    pub index_store: IndexStoreConfig,
    /// Decision thresholds and trusted channels.
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    /// Default ensemble blending weights.
    #[serde(default)]
    pub ensemble: EnsembleConfig,
    /// Default Platt calibration parameters.
    #[serde(default)]
    pub platt: PlattConfig,
    /// Monitor alert thresholds.
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            broker: BrokerConfig::default(),
            entity_store: EntityStoreConfig::default(),
            object_store: ObjectStoreConfig::default(),
            index_store: IndexStoreConfig::default(),
            thresholds: ThresholdsConfig::default(),
            ensemble: EnsembleConfig::default(),
            platt: PlattConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from disk using the default resolution rules:
    /// `FRAUD_CONFIG` env var if set, else `./fraud.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.broker.validate()?;
        self.entity_store.validate()?;
        self.object_store.validate()?;
        self.index_store.validate()?;
        self.thresholds.validate()?;
        self.ensemble.validate()?;
        self.platt.validate()?;
        self.monitoring.validate()?;
        Ok(())
    }
}

/// HTTP server configuration for a pipeline service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen port for this service's HTTP surface.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Optional explicit bind address; defaults to all interfaces.
    #[serde(default)]
    pub bind: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port(), bind: None }
    }
}

impl ServerConfig {
    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("server.port must be nonzero".to_string()));
        }
        Ok(())
    }
}

/// Returns the default HTTP port.
const fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Event-log bootstrap configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    /// Bootstrap endpoints for the event log.
    #[serde(default = "default_bootstrap_servers")]
    pub bootstrap_servers: Vec<String>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self { bootstrap_servers: default_bootstrap_servers() }
    }
}

impl BrokerConfig {
    /// Validates broker configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bootstrap_servers.is_empty() {
            return Err(ConfigError::Invalid("broker.bootstrap_servers must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Returns the default single-node broker bootstrap list.
fn default_bootstrap_servers() -> Vec<String> {
    vec!["localhost:9092".to_string()]
}

/// Entity state store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntityStoreBackend {
    /// Process-local in-memory store; single-process demos and tests only.
    #[default]
    InMemory,
    /// Shared key/value store reachable over the network.
    Kv,
}

/// Per-entity key/value state store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityStoreConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: EntityStoreBackend,
    /// Store host (required for the `kv` backend).
    #[serde(default)]
    pub host: Option<String>,
    /// Store port (required for the `kv` backend).
    #[serde(default)]
    pub port: Option<u16>,
}

impl Default for EntityStoreConfig {
    fn default() -> Self {
        Self { backend: EntityStoreBackend::default(), host: None, port: None }
    }
}

impl EntityStoreConfig {
    /// Validates entity store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == EntityStoreBackend::Kv && self.host.is_none() {
            return Err(ConfigError::Invalid("entity_store.host is required for the kv backend".to_string()));
        }
        Ok(())
    }
}

/// Object-store credential reference: names of environment variables,
/// never raw secret values, so secrets are sourced from the environment
/// rather than the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStoreCredentials {
    /// Environment variable holding the access key.
    pub access_key_env: String,
    /// Environment variable holding the secret key.
    pub secret_key_env: String,
}

/// Evidence-bundle object store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStoreConfig {
    /// Object-store endpoint (omit for the default local provider).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bucket name.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Whether the endpoint requires TLS.
    #[serde(default = "default_true")]
    pub secure: bool,
    /// Optional credential environment-variable references.
    #[serde(default)]
    pub credentials: Option<ObjectStoreCredentials>,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self { endpoint: None, bucket: default_bucket(), secure: true, credentials: None }
    }
}

impl ObjectStoreConfig {
    /// Validates object store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid("object_store.bucket must be set".to_string()));
        }
        if let Some(endpoint) = &self.endpoint {
            let trimmed = endpoint.trim();
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "object_store.endpoint must include http:// or https://".to_string(),
                ));
            }
            if trimmed.starts_with("http://") && self.secure {
                return Err(ConfigError::Invalid(
                    "object_store.endpoint uses http:// but secure = true".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Returns the default evidence-bundle bucket name.
fn default_bucket() -> String {
    "fraud-evidence".to_string()
}

/// Returns `true`.
const fn default_true() -> bool {
    true
}

/// Audit index store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexStoreConfig {
    /// Data-source name (sqlite path, or a connection string for another backend).
    #[serde(default = "default_index_dsn")]
    pub dsn: String,
}

impl Default for IndexStoreConfig {
    fn default() -> Self {
        Self { dsn: default_index_dsn() }
    }
}

impl IndexStoreConfig {
    /// Validates index store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.dsn.trim().is_empty() {
            return Err(ConfigError::Invalid("index_store.dsn must be set".to_string()));
        }
        Ok(())
    }
}

/// Returns the default audit index store DSN.
fn default_index_dsn() -> String {
    "fraud-audit.db".to_string()
}

/// Decision thresholds and trusted-channel configuration (§4.4, §6).
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdsConfig {
    /// `BLOCK_THRESHOLD` (default 0.90).
    #[serde(default = "default_block_threshold")]
    pub block_threshold: f64,
    /// `HOLD_THRESHOLD` (default 0.70).
    #[serde(default = "default_hold_threshold")]
    pub hold_threshold: f64,
    /// `TRUSTED_CHANNELS` (default `{mobile}`).
    #[serde(default = "default_trusted_channels")]
    pub trusted_channels: Vec<Channel>,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            block_threshold: default_block_threshold(),
            hold_threshold: default_hold_threshold(),
            trusted_channels: default_trusted_channels(),
        }
    }
}

impl ThresholdsConfig {
    /// Validates threshold configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.block_threshold) {
            return Err(ConfigError::Invalid("thresholds.block_threshold must be in [0, 1]".to_string()));
        }
        if !(0.0..=1.0).contains(&self.hold_threshold) {
            return Err(ConfigError::Invalid("thresholds.hold_threshold must be in [0, 1]".to_string()));
        }
        if self.hold_threshold > self.block_threshold {
            return Err(ConfigError::Invalid(
                "thresholds.hold_threshold must not exceed block_threshold".to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns the default `BLOCK_THRESHOLD`.
const fn default_block_threshold() -> f64 {
    crate::policy::DEFAULT_BLOCK_THRESHOLD
}

/// Returns the default `HOLD_THRESHOLD`.
const fn default_hold_threshold() -> f64 {
    crate::policy::DEFAULT_HOLD_THRESHOLD
}

/// Returns the default `TRUSTED_CHANNELS` set.
fn default_trusted_channels() -> Vec<Channel> {
    vec![Channel::Mobile]
}

/// Ensemble blending weight configuration, `(w_g, w_n, w_r)` (§4.3).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EnsembleConfig {
    /// Weight on the gradient-boosted sub-score.
    #[serde(default = "default_weight_gradient_boosted")]
    pub gradient_boosted: f64,
    /// Weight on the neural sub-score.
    #[serde(default = "default_weight_neural")]
    pub neural: f64,
    /// Weight on the rules sub-score.
    #[serde(default = "default_weight_rules")]
    pub rules: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            gradient_boosted: default_weight_gradient_boosted(),
            neural: default_weight_neural(),
            rules: default_weight_rules(),
        }
    }
}

impl EnsembleConfig {
    /// Converts to the runtime [`fraud_core::EnsembleWeights`] type.
    #[must_use]
    pub const fn into_weights(self) -> fraud_core::EnsembleWeights {
        fraud_core::EnsembleWeights {
            gradient_boosted: self.gradient_boosted,
            neural: self.neural,
            rules: self.rules,
        }
    }

    /// Validates that the configured weights sum to `1.0`.
    fn validate(&self) -> Result<(), ConfigError> {
        self.into_weights().validate().map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}

/// Returns the default gradient-boosted ensemble weight.
const fn default_weight_gradient_boosted() -> f64 {
    fraud_core::DEFAULT_ENSEMBLE_WEIGHTS.gradient_boosted
}

/// Returns the default neural ensemble weight.
const fn default_weight_neural() -> f64 {
    fraud_core::DEFAULT_ENSEMBLE_WEIGHTS.neural
}

/// Returns the default rules ensemble weight.
const fn default_weight_rules() -> f64 {
    fraud_core::DEFAULT_ENSEMBLE_WEIGHTS.rules
}

/// Default Platt calibration parameters, `(k, x0)` (§4.3, §9).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlattConfig {
    /// Logistic steepness.
    #[serde(default = "default_platt_k")]
    pub k: f64,
    /// Logistic midpoint.
    #[serde(default = "default_platt_x0")]
    pub x0: f64,
}

impl Default for PlattConfig {
    fn default() -> Self {
        Self { k: default_platt_k(), x0: default_platt_x0() }
    }
}

impl PlattConfig {
    /// Converts to the runtime [`fraud_core::PlattParams`] type.
    #[must_use]
    pub const fn into_params(self) -> fraud_core::PlattParams {
        fraud_core::PlattParams { k: self.k, x0: self.x0 }
    }

    /// Validates Platt parameters (steepness must be positive and finite).
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.k.is_finite() || self.k <= 0.0 {
            return Err(ConfigError::Invalid("platt.k must be a positive finite number".to_string()));
        }
        if !(0.0..=1.0).contains(&self.x0) {
            return Err(ConfigError::Invalid("platt.x0 must be in [0, 1]".to_string()));
        }
        Ok(())
    }
}

/// Returns the default Platt steepness parameter.
const fn default_platt_k() -> f64 {
    fraud_core::DEFAULT_PLATT_PARAMS.k
}

/// Returns the default Platt midpoint parameter.
const fn default_platt_x0() -> f64 {
    fraud_core::DEFAULT_PLATT_PARAMS.x0
}

/// Monitor alert threshold configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MonitoringConfig {
    /// PSI value above which the monitor raises a drift alert.
    #[serde(default = "default_psi_alert_threshold")]
    pub psi_alert_threshold: f64,
    /// Brier score above which the monitor raises a calibration alert.
    #[serde(default = "default_brier_alert_threshold")]
    pub brier_alert_threshold: f64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            psi_alert_threshold: default_psi_alert_threshold(),
            brier_alert_threshold: default_brier_alert_threshold(),
        }
    }
}

impl MonitoringConfig {
    /// Validates monitor alert thresholds.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.psi_alert_threshold <= 0.0 {
            return Err(ConfigError::Invalid("monitoring.psi_alert_threshold must be positive".to_string()));
        }
        if self.brier_alert_threshold <= 0.0 {
            return Err(ConfigError::Invalid("monitoring.brier_alert_threshold must be positive".to_string()));
        }
        Ok(())
    }
}

/// Returns the default PSI drift alert threshold.
const fn default_psi_alert_threshold() -> f64 {
    DEFAULT_PSI_ALERT_THRESHOLD
}

/// Returns the default Brier-score alert threshold.
const fn default_brier_alert_threshold() -> f64 {
    DEFAULT_BRIER_ALERT_THRESHOLD
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

/// Resolves the configuration path from an explicit argument, the
/// `FRAUD_CONFIG` environment variable, or the default filename.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates path shape limits before touching the filesystem.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let as_str = path.to_string_lossy();
    if as_str.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds maximum length".to_string()));
    }
    for component in path.components() {
        if let Component::Normal(part) = component
            && part.len() > MAX_PATH_COMPONENT_LENGTH
        {
            return Err(ConfigError::Invalid("config path component exceeds maximum length".to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_validates() {
        ServiceConfig::default().validate().expect("default config must validate");
    }

    #[test]
    fn rejects_hold_threshold_above_block_threshold() {
        let mut config = ServiceConfig::default();
        config.thresholds.hold_threshold = 0.95;
        config.thresholds.block_threshold = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unnormalized_ensemble_weights() {
        let mut config = ServiceConfig::default();
        config.ensemble.rules = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_parses_toml_file_from_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fraud.toml");
        let mut file = fs::File::create(&path).expect("create");
        writeln!(file, "[server]\nport = 9090\n").expect("write");
        let config = ServiceConfig::load(Some(&path)).expect("load");
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn load_rejects_oversized_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fraud.toml");
        let oversized = "a".repeat(MAX_CONFIG_FILE_SIZE + 1);
        fs::write(&path, oversized).expect("write");
        assert!(matches!(ServiceConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
    }
}
