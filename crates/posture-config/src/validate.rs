use crate::config::{Config, StoreBackend};
use anyhow::{bail, Result};
use std::net::IpAddr;

const MAX_PAGE_BYTES: u64 = 500 * 1024 * 1024;

pub fn validate_config(config: &Config) -> Result<()> {
    let server = &config.server;
    if server.bind.parse::<IpAddr>().is_err() {
        bail!(
            "Invalid config field 'server.bind': {:?} is not an IP address",
            server.bind
        );
    }
    if server.body_limit_bytes == 0 {
        bail!("Invalid config field 'server.body_limit_bytes': must be greater than 0");
    }

    let sources = &config.sources;
    for (field, value) in [
        ("crtsh_timeout_secs", sources.crtsh_timeout_secs),
        ("page_timeout_secs", sources.page_timeout_secs),
        ("robots_timeout_secs", sources.robots_timeout_secs),
        ("request_timeout_secs", sources.request_timeout_secs),
        ("poll_interval_ms", sources.poll_interval_ms),
        ("poll_ceiling_secs", sources.poll_ceiling_secs),
    ] {
        if value == 0 {
            bail!("Invalid config field 'sources.{}': must be greater than 0", field);
        }
    }
    if sources.poll_interval() >= sources.poll_ceiling() {
        bail!("Invalid config: 'sources.poll_interval_ms' must be shorter than 'sources.poll_ceiling_secs'");
    }
    if sources.page_max_bytes == 0 || sources.page_max_bytes > MAX_PAGE_BYTES {
        bail!("Invalid config field 'sources.page_max_bytes': must be between 1 and 524288000 (500MB)");
    }

    for (field, url) in [
        ("crtsh_url", &sources.crtsh_url),
        ("ssllabs_url", &sources.ssllabs_url),
        ("urlscan_url", &sources.urlscan_url),
        ("builtwith_url", &sources.builtwith_url),
        ("shodan_url", &sources.shodan_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!(
                "Invalid config field 'sources.{}': {:?} must be an http(s) URL",
                field,
                url
            );
        }
    }

    for (field, key) in [
        ("urlscan_api_key", &sources.urlscan_api_key),
        ("builtwith_api_key", &sources.builtwith_api_key),
        ("shodan_api_key", &sources.shodan_api_key),
    ] {
        if key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            bail!(
                "Invalid config field 'sources.{}': empty key (omit it to disable the source)",
                field
            );
        }
    }

    if config.store.backend == StoreBackend::File && config.store.path.as_os_str().is_empty() {
        bail!("Invalid config field 'store.path': required for the file backend");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = Config::default();
        config.sources.robots_timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("sources.robots_timeout_secs"));
    }

    #[test]
    fn poll_interval_must_be_below_ceiling() {
        let mut config = Config::default();
        config.sources.poll_interval_ms = 5_000;
        config.sources.poll_ceiling_secs = 5;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("must be shorter than"));
    }

    #[test]
    fn page_cap_bounds() {
        let mut config = Config::default();
        config.sources.page_max_bytes = MAX_PAGE_BYTES + 1;
        assert!(validate_config(&config)
            .unwrap_err()
            .to_string()
            .contains("must be between 1 and 524288000"));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let mut config = Config::default();
        config.sources.urlscan_api_key = Some("  ".into());
        assert!(validate_config(&config)
            .unwrap_err()
            .to_string()
            .contains("sources.urlscan_api_key"));
    }

    #[test]
    fn bind_must_be_an_ip() {
        let mut config = Config::default();
        config.server.bind = "localhost".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn file_backend_needs_path() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::File;
        config.store.path = Default::default();
        assert!(validate_config(&config).is_err());
    }
}
