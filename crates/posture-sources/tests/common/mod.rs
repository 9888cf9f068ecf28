#![allow(dead_code)]

use posture_config::SourcesConfig;
use posture_core::Target;
use posture_sources::net::ReqwestHttpClient;
use wiremock::MockServer;

/// Every upstream pointed at `server`, with polling shrunk for tests.
pub fn config_for(server: &MockServer) -> SourcesConfig {
    let uri = server.uri();
    SourcesConfig {
        crtsh_url: uri.clone(),
        ssllabs_url: uri.clone(),
        urlscan_url: uri.clone(),
        builtwith_url: uri.clone(),
        shodan_url: uri,
        crtsh_timeout_secs: 5,
        page_timeout_secs: 5,
        robots_timeout_secs: 5,
        request_timeout_secs: 5,
        poll_interval_ms: 20,
        poll_ceiling_secs: 1,
        ..Default::default()
    }
}

pub fn http() -> ReqwestHttpClient {
    ReqwestHttpClient::new("posture-tests").unwrap()
}

/// Target whose base URL is the mock server.
pub fn target_on(server: &MockServer) -> Target {
    Target {
        domain: "example.com".to_string(),
        url: format!("{}/", server.uri()),
    }
}
