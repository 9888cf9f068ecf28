use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "posture.toml";

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted JSON request body.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

/// Upstream endpoints, credentials and time limits for the source adapters.
///
/// Timeouts are whole seconds in TOML; the poll interval is milliseconds so
/// tests can shrink it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourcesConfig {
    #[serde(default = "default_crtsh_url")]
    pub crtsh_url: String,
    #[serde(default = "default_ssllabs_url")]
    pub ssllabs_url: String,
    #[serde(default = "default_urlscan_url")]
    pub urlscan_url: String,
    #[serde(default = "default_builtwith_url")]
    pub builtwith_url: String,
    #[serde(default = "default_shodan_url")]
    pub shodan_url: String,

    #[serde(default)]
    pub urlscan_api_key: Option<String>,
    #[serde(default)]
    pub builtwith_api_key: Option<String>,
    #[serde(default)]
    pub shodan_api_key: Option<String>,

    #[serde(default = "default_crtsh_timeout")]
    pub crtsh_timeout_secs: u64,
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,
    #[serde(default = "default_page_max_bytes")]
    pub page_max_bytes: u64,
    #[serde(default = "default_robots_timeout")]
    pub robots_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_ceiling")]
    pub poll_ceiling_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            crtsh_url: default_crtsh_url(),
            ssllabs_url: default_ssllabs_url(),
            urlscan_url: default_urlscan_url(),
            builtwith_url: default_builtwith_url(),
            shodan_url: default_shodan_url(),
            urlscan_api_key: None,
            builtwith_api_key: None,
            shodan_api_key: None,
            crtsh_timeout_secs: default_crtsh_timeout(),
            page_timeout_secs: default_page_timeout(),
            page_max_bytes: default_page_max_bytes(),
            robots_timeout_secs: default_robots_timeout(),
            request_timeout_secs: default_request_timeout(),
            poll_interval_ms: default_poll_interval(),
            poll_ceiling_secs: default_poll_ceiling(),
            user_agent: default_user_agent(),
        }
    }
}

impl SourcesConfig {
    pub fn crtsh_timeout(&self) -> Duration {
        Duration::from_secs(self.crtsh_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.robots_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_ceiling(&self) -> Duration {
        Duration::from_secs(self.poll_ceiling_secs)
    }
}

fn default_crtsh_url() -> String {
    "https://crt.sh".to_string()
}

fn default_ssllabs_url() -> String {
    "https://api.ssllabs.com".to_string()
}

fn default_urlscan_url() -> String {
    "https://urlscan.io".to_string()
}

fn default_builtwith_url() -> String {
    "https://api.builtwith.com".to_string()
}

fn default_shodan_url() -> String {
    "https://api.shodan.io".to_string()
}

fn default_crtsh_timeout() -> u64 {
    15
}

fn default_page_timeout() -> u64 {
    15
}

fn default_page_max_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_robots_timeout() -> u64 {
    8
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    3_000
}

fn default_poll_ceiling() -> u64 {
    120
}

fn default_user_agent() -> String {
    concat!("posture/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("posture-reports.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.sources.poll_ceiling(), Duration::from_secs(120));
        assert_eq!(config.sources.page_max_bytes, 50 * 1024 * 1024);
        assert!(config.sources.urlscan_api_key.is_none());
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [sources]
            crtsh_url = "http://127.0.0.1:9000"
            poll_interval_ms = 10

            [store]
            backend = "file"
            path = "/var/lib/posture/reports.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.sources.crtsh_url, "http://127.0.0.1:9000");
        assert_eq!(config.sources.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.sources.robots_timeout_secs, 8);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.server.addr(), "0.0.0.0:5000");
    }
}
