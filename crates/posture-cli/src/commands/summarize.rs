use crate::cli::Format;
use crate::commands::breaches_threshold;
use crate::output::print_summary;
use anyhow::{Context, Result};
use posture_core::{summarize, RawScanBag, Severity};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub fn summarize_file(
    path: &Path,
    format: Format,
    fail_on_severity: Option<Severity>,
) -> Result<bool> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bag file at {:?}", path))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Bag file {:?} is not valid JSON", path))?;
    let bag: RawScanBag = serde_json::from_value(unwrap_bag(value))
        .with_context(|| format!("Bag file {:?} is not a scan bag", path))?;

    let summary = summarize(&bag);
    print_summary(&summary, format)?;

    Ok(breaches_threshold(&summary, fail_on_severity))
}

/// Accepts a bare bag, a `{ok, result}` API response or `scan --format json`
/// output (summary with the bag under `raw`).
fn unwrap_bag(mut value: Value) -> Value {
    if value.get("ok").is_some() {
        if let Some(result) = value.get_mut("result").map(Value::take) {
            return result;
        }
    }
    if let Some(raw) = value
        .get_mut("raw")
        .filter(|r| r.is_object())
        .map(Value::take)
    {
        return raw;
    }
    value
}
