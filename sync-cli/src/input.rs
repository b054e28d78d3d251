//! JSON arguments: inline text, or `@path` to read a file.

use anyhow::{Context, Result};
use autus_sync_types::SyncData;
use serde_json::Value;

/// Parse an argument as any JSON value.
pub fn read_value(arg: &str) -> Result<Value> {
    let text = match arg.strip_prefix('@') {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
        }
        None => arg.to_string(),
    };
    serde_json::from_str(&text).context("Invalid JSON")
}

/// Parse an argument as a JSON object.
pub fn read_object(arg: &str) -> Result<SyncData> {
    match read_value(arg)? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("Expected a JSON object, got {}", kind(&other)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
