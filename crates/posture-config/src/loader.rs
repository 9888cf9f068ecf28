use crate::config::Config;
use crate::validate::validate_config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_PORT: &str = "PORT";
pub const ENV_BIND: &str = "POSTURE_BIND";
pub const ENV_STORE_PATH: &str = "POSTURE_STORE_PATH";
pub const ENV_URLSCAN_KEY: &str = "URLSCAN_API_KEY";
pub const ENV_BUILTWITH_KEY: &str = "BUILTWITH_API_KEY";
pub const ENV_SHODAN_KEY: &str = "SHODAN_API_KEY";

/// Reads and validates the TOML file at `path`. A missing file yields the
/// defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = read_file(path)?;
    validate_config(&config)?;
    Ok(config)
}

/// File, then process environment, then validation.
pub fn load_with_env(path: &Path) -> Result<Config> {
    let mut config = read_file(path)?;
    apply_env(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {:?}", path))?;

    toml::from_str(&content).with_context(|| "Failed to parse TOML config file")
}

/// Overrides config fields from environment variables. `lookup` abstracts
/// the environment so tests do not touch process state.
pub fn apply_env<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(ENV_PORT) {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value: {:?}", ENV_PORT, port))?;
    }
    if let Some(bind) = lookup(ENV_BIND) {
        config.server.bind = bind;
    }
    if let Some(path) = lookup(ENV_STORE_PATH) {
        config.store.path = PathBuf::from(path);
        config.store.backend = crate::config::StoreBackend::File;
    }
    if let Some(key) = lookup(ENV_URLSCAN_KEY) {
        config.sources.urlscan_api_key = Some(key);
    }
    if let Some(key) = lookup(ENV_BUILTWITH_KEY) {
        config.sources.builtwith_api_key = Some(key);
    }
    if let Some(key) = lookup(ENV_SHODAN_KEY) {
        config.sources.shodan_api_key = Some(key);
    }
    Ok(())
}
