//! Config validation tests for fraud-config.
// fraud-config/tests/config_validation.rs
// ============================================================================
// Module: Config Validation Tests
// Description: Tests for fraud.toml loading, defaults, schema, and docs.
// Purpose: Ensure service configuration is fail-closed and deterministic.
// ============================================================================

use fraud_config::ServiceConfig;
use fraud_config::config_docs_markdown;
use fraud_config::config_schema;
use fraud_config::config_toml_example;

type TestResult = Result<(), String>;

/// Asserts that a validation result is an error containing a substring.
fn assert_invalid<T>(result: Result<T, impl std::fmt::Display>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn example_toml_parses_and_validates() -> TestResult {
    let example = config_toml_example();
    let config: ServiceConfig = toml::from_str(&example).map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn schema_declares_every_top_level_section() -> TestResult {
    let schema = config_schema();
    let properties = schema["properties"].as_object().ok_or("schema root must be an object")?;
    for section in ["server", "broker", "entity_store", "object_store", "index_store", "thresholds", "ensemble", "platt", "monitoring"]
    {
        if !properties.contains_key(section) {
            return Err(format!("schema missing section: {section}"));
        }
    }
    Ok(())
}

#[test]
fn docs_contain_all_config_sections() -> TestResult {
    let docs = config_docs_markdown().map_err(|err| err.to_string())?;
    for section in ["### server", "### broker", "### entity_store", "### thresholds", "### ensemble", "### platt", "### monitoring"]
    {
        if !docs.contains(section) {
            return Err(format!("docs missing section: {section}"));
        }
    }
    Ok(())
}

#[test]
fn kv_entity_store_without_host_is_rejected() -> TestResult {
    let toml_src = r#"
        [entity_store]
        backend = "kv"
    "#;
    let config: ServiceConfig = toml::from_str(toml_src).map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "entity_store.host")
}

#[test]
fn http_endpoint_with_secure_flag_is_rejected() -> TestResult {
    let toml_src = r#"
        [object_store]
        endpoint = "http://minio.local"
        secure = true
    "#;
    let config: ServiceConfig = toml::from_str(toml_src).map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "object_store.endpoint")
}

#[test]
fn zero_port_is_rejected() -> TestResult {
    let toml_src = r#"
        [server]
        port = 0
    "#;
    let config: ServiceConfig = toml::from_str(toml_src).map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "server.port")
}
