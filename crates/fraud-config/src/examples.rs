// fraud-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for `fraud.toml`. Output is deterministic and kept in
//! sync with schema and docs.

/// Returns a canonical example `fraud.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
port = 8080

[broker]
bootstrap_servers = ["localhost:9092"]

[entity_store]
backend = "kv"
host = "localhost"
port = 6379

[object_store]
bucket = "fraud-evidence"
secure = true
# endpoint = "https://s3.example.com"

[index_store]
dsn = "fraud-audit.db"

[thresholds]
block_threshold = 0.90
hold_threshold = 0.70
trusted_channels = ["mobile"]

[ensemble]
gradient_boosted = 0.5
neural = 0.3
rules = 0.2

[platt]
k = 5.0
x0 = 0.5

[monitoring]
psi_alert_threshold = 0.2
brier_alert_threshold = 0.25
"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_parses_as_service_config() {
        let example = config_toml_example();
        let config: crate::ServiceConfig = toml::from_str(&example).expect("parse example");
        config.validate().expect("example must validate");
    }
}
