use crate::cli::Format;
use crate::commands::breaches_threshold;
use crate::output::print_summary;
use anyhow::{Context, Result};
use posture_config::{load_with_env, DEFAULT_CONFIG_FILE};
use posture_core::{summarize, Severity, Target};
use posture_sources::Orchestrator;
use std::path::PathBuf;
use tracing::debug;

/// Runs a live scan and prints its summary. Returns whether the
/// `--fail-on-severity` threshold was breached.
pub fn scan(
    target: Option<&str>,
    url: Option<&str>,
    config_path: Option<&PathBuf>,
    format: Format,
    fail_on_severity: Option<Severity>,
) -> Result<bool> {
    let target = Target::from_parts(target, url)?;

    let config_path = config_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = load_with_env(&config_path)?;
    debug!(config = %config_path.display(), "config loaded");
    let orchestrator = Orchestrator::from_config(&config.sources)
        .context("Failed to build HTTP client for source adapters")?;

    eprintln!("Scanning {} ({})...", target.domain, target.url);
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let bag = runtime.block_on(orchestrator.run_scan(&target));

    let summary = summarize(&bag);
    print_summary(&summary, format)?;

    Ok(breaches_threshold(&summary, fail_on_severity))
}
