use anyhow::Result;
use posture_core::ScanSummary;

/// Pretty JSON with the same field names the HTTP API uses.
pub fn render_json(summary: &ScanSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}
