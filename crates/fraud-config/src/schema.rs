// fraud-config/src/schema.rs
// ============================================================================
// Module: Config Schema
// Description: JSON schema builder for fraud.toml.
// Purpose: Provide canonical validation schema for config artifacts.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! This module defines the JSON Schema for pipeline service configuration.
//! The schema is generated from the canonical config model and is used by
//! tooling, docs, and validation pipelines.

use serde_json::Value;
use serde_json::json;

use crate::config::DEFAULT_BRIER_ALERT_THRESHOLD;
use crate::config::DEFAULT_PSI_ALERT_THRESHOLD;
use crate::policy::DEFAULT_BLOCK_THRESHOLD;
use crate::policy::DEFAULT_HOLD_THRESHOLD;

/// Returns the JSON schema for `fraud.toml`.
#[must_use]
pub fn config_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "fraudops://contract/schemas/config.schema.json",
        "title": "FraudOps Control Tower Service Configuration",
        "description": "Configuration for the fraud-risk decisioning pipeline services.",
        "type": "object",
        "properties": {
            "server": server_config_schema(),
            "broker": broker_config_schema(),
            "entity_store": entity_store_config_schema(),
            "object_store": object_store_config_schema(),
            "index_store": index_store_config_schema(),
            "thresholds": thresholds_config_schema(),
            "ensemble": ensemble_config_schema(),
            "platt": platt_config_schema(),
            "monitoring": monitoring_config_schema()
        },
        "additionalProperties": false
    })
}

/// Schema for the server configuration section.
fn server_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "port": { "type": "integer", "minimum": 1, "maximum": 65_535, "default": 8080 },
            "bind": { "oneOf": [{ "type": "null" }, { "type": "string" }], "default": null }
        },
        "additionalProperties": false
    })
}

/// Schema for the broker configuration section.
fn broker_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "bootstrap_servers": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 1,
                "default": ["localhost:9092"]
            }
        },
        "additionalProperties": false
    })
}

/// Schema for the entity store configuration section.
fn entity_store_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "backend": { "type": "string", "enum": ["in_memory", "kv"], "default": "in_memory" },
            "host": { "oneOf": [{ "type": "null" }, { "type": "string" }], "default": null },
            "port": { "oneOf": [{ "type": "null" }, { "type": "integer", "minimum": 1, "maximum": 65_535 }], "default": null }
        },
        "additionalProperties": false
    })
}

/// Schema for the object store configuration section.
fn object_store_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "endpoint": { "oneOf": [{ "type": "null" }, { "type": "string" }], "default": null },
            "bucket": { "type": "string", "minLength": 1, "default": "fraud-evidence" },
            "secure": { "type": "boolean", "default": true },
            "credentials": {
                "oneOf": [
                    { "type": "null" },
                    {
                        "type": "object",
                        "properties": {
                            "access_key_env": { "type": "string" },
                            "secret_key_env": { "type": "string" }
                        },
                        "required": ["access_key_env", "secret_key_env"],
                        "additionalProperties": false
                    }
                ],
                "default": null
            }
        },
        "additionalProperties": false
    })
}

/// Schema for the index store configuration section.
fn index_store_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "dsn": { "type": "string", "minLength": 1, "default": "fraud-audit.db" }
        },
        "additionalProperties": false
    })
}

/// Schema for the decision thresholds configuration section.
fn thresholds_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "block_threshold": { "type": "number", "minimum": 0.0, "maximum": 1.0, "default": DEFAULT_BLOCK_THRESHOLD },
            "hold_threshold": { "type": "number", "minimum": 0.0, "maximum": 1.0, "default": DEFAULT_HOLD_THRESHOLD },
            "trusted_channels": {
                "type": "array",
                "items": { "type": "string", "enum": ["web", "mobile", "atm", "pos", "phone", "api"] },
                "default": ["mobile"]
            }
        },
        "additionalProperties": false
    })
}

/// Schema for the ensemble weight configuration section.
fn ensemble_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "gradient_boosted": { "type": "number", "minimum": 0.0, "maximum": 1.0, "default": 0.5 },
            "neural": { "type": "number", "minimum": 0.0, "maximum": 1.0, "default": 0.3 },
            "rules": { "type": "number", "minimum": 0.0, "maximum": 1.0, "default": 0.2 }
        },
        "additionalProperties": false,
        "description": "Weights must sum to 1.0 within 1e-9; enforced at load time, not by this schema."
    })
}

/// Schema for the Platt calibration configuration section.
fn platt_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "k": { "type": "number", "exclusiveMinimum": 0.0, "default": 5.0 },
            "x0": { "type": "number", "minimum": 0.0, "maximum": 1.0, "default": 0.5 }
        },
        "additionalProperties": false
    })
}

/// Schema for the monitor alert threshold configuration section.
fn monitoring_config_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "psi_alert_threshold": { "type": "number", "exclusiveMinimum": 0.0, "default": DEFAULT_PSI_ALERT_THRESHOLD },
            "brier_alert_threshold": { "type": "number", "exclusiveMinimum": 0.0, "default": DEFAULT_BRIER_ALERT_THRESHOLD }
        },
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_schema_declares_all_top_level_sections() {
        let schema = config_schema();
        let properties = schema["properties"].as_object().expect("object schema");
        for section in [
            "server",
            "broker",
            "entity_store",
            "object_store",
            "index_store",
            "thresholds",
            "ensemble",
            "platt",
            "monitoring",
        ] {
            assert!(properties.contains_key(section), "missing section {section}");
        }
    }
}
