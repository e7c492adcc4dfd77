// fraud-config/src/docs.rs
// ============================================================================
// Module: Config Docs Generator
// Description: Markdown generator for fraud.toml documentation.
// Purpose: Keep config docs in sync with schema and validation.
// Dependencies: serde_json, std
// ============================================================================

//! ## Overview
//! Generates `docs/configuration/fraud.toml.md` from the canonical
//! configuration schema. This output is deterministic.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::schema::config_schema;

/// Default output path for generated configuration docs.
const DOCS_PATH: &str = "docs/configuration/fraud.toml.md";

/// Errors raised when generating or verifying config docs.
#[derive(Debug, Error)]
pub enum DocsError {
    /// IO failure while writing docs.
    #[error("docs io error: {0}")]
    Io(String),
    /// Schema traversal or rendering error.
    #[error("docs schema error: {0}")]
    Schema(String),
    /// Generated docs do not match the committed file.
    #[error("docs drift: {0}")]
    Drift(String),
}

/// Generates the configuration markdown documentation.
///
/// # Errors
///
/// Returns [`DocsError`] when schema traversal fails.
pub fn config_docs_markdown() -> Result<String, DocsError> {
    let schema = config_schema();
    let properties = schema["properties"].as_object().ok_or_else(|| {
        DocsError::Schema("config schema root must be an object with a properties map".to_string())
    })?;

    let mut out = String::new();
    out.push_str("<!--\n");
    out.push_str("docs/configuration/fraud.toml.md\n");
    out.push_str("============================================================================\n");
    out.push_str("Document: FraudOps Control Tower Service Configuration\n");
    out.push_str("Description: Reference for fraud.toml configuration fields.\n");
    out.push_str("Generated: This file is auto-generated; do not edit manually.\n");
    out.push_str("============================================================================\n");
    out.push_str("-->\n\n");

    out.push_str("# fraud.toml Configuration\n\n");
    out.push_str("## Overview\n\n");
    out.push_str(
        "`fraud.toml` configures the broker bootstrap, entity/object/index stores, decision \
         thresholds, ensemble weights, Platt calibration, and monitor alert thresholds shared by \
         every pipeline service. All inputs are validated and fail closed on errors.\n\n",
    );

    out.push_str("## Top-Level Sections\n\n");
    for (section, section_schema) in properties {
        writeln!(out, "### {section}").map_err(|err| DocsError::Schema(err.to_string()))?;
        out.push('\n');
        out.push_str(&render_fields_table(section_schema)?);
        out.push('\n');
    }

    Ok(out)
}

/// Renders a schema section's `properties` map as a markdown table.
fn render_fields_table(section_schema: &Value) -> Result<String, DocsError> {
    let properties = section_schema["properties"]
        .as_object()
        .ok_or_else(|| DocsError::Schema("section schema missing properties map".to_string()))?;
    let mut table = String::from("| Field | Type | Default |\n|---|---|---|\n");
    for (field, field_schema) in properties {
        let field_type = field_type_label(field_schema);
        let default = field_schema.get("default").map_or_else(|| "—".to_string(), |value| value.to_string());
        writeln!(table, "| `{field}` | {field_type} | `{default}` |").map_err(|err| DocsError::Schema(err.to_string()))?;
    }
    Ok(table)
}

/// Renders a field's declared JSON Schema type as a short label.
fn field_type_label(field_schema: &Value) -> String {
    if let Some(kind) = field_schema.get("type").and_then(Value::as_str) {
        return kind.to_string();
    }
    if field_schema.get("oneOf").is_some() {
        return "nullable".to_string();
    }
    "object".to_string()
}

/// Writes the generated configuration docs to [`DOCS_PATH`] (or `path` if given).
///
/// # Errors
///
/// Returns [`DocsError`] when generation or the filesystem write fails.
pub fn write_config_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let markdown = config_docs_markdown()?;
    let target = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|err| DocsError::Io(err.to_string()))?;
    }
    fs::write(target, markdown).map_err(|err| DocsError::Io(err.to_string()))
}

/// Verifies the committed docs file matches freshly generated output.
///
/// # Errors
///
/// Returns [`DocsError::Drift`] when the committed file is stale, or
/// [`DocsError::Io`]/[`DocsError::Schema`] on lower-level failures.
pub fn verify_config_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let markdown = config_docs_markdown()?;
    let target = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let committed = fs::read_to_string(target).map_err(|err| DocsError::Io(err.to_string()))?;
    if committed != markdown {
        return Err(DocsError::Drift(format!("{} is stale; regenerate with write_config_docs", target.display())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docs_markdown_mentions_every_section() {
        let markdown = config_docs_markdown().expect("render docs");
        for section in ["server", "broker", "entity_store", "thresholds", "ensemble", "platt", "monitoring"] {
            assert!(markdown.contains(&format!("### {section}")), "missing section heading for {section}");
        }
    }

    #[test]
    fn write_then_verify_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fraud.toml.md");
        write_config_docs(Some(&path)).expect("write");
        verify_config_docs(Some(&path)).expect("verify");
    }

    #[test]
    fn verify_detects_drift() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fraud.toml.md");
        fs::write(&path, "stale content").expect("write");
        assert!(matches!(verify_config_docs(Some(&path)), Err(DocsError::Drift(_))));
    }
}
