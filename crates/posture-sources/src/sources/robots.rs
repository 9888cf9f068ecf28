use super::Source;
use crate::net::ReqwestHttpClient;
use posture_config::SourcesConfig;
use posture_core::{AdapterResult, Target};
use std::time::Duration;
use tracing::debug;

const NAME: &str = "robots";
const MAX_BYTES: u64 = 512 * 1024;

/// robots.txt fetch. Never fails: an unreachable or missing file becomes the
/// placeholder text `not found (<cause>)`.
#[derive(Clone, Debug)]
pub struct RobotsSource {
    http: ReqwestHttpClient,
    timeout: Duration,
}

impl RobotsSource {
    pub fn new(http: ReqwestHttpClient, config: &SourcesConfig) -> Self {
        Self {
            http,
            timeout: config.robots_timeout(),
        }
    }
}

#[async_trait::async_trait]
impl Source for RobotsSource {
    type Output = String;

    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self, target: &Target) -> AdapterResult<String> {
        let url = target.robots_url();
        match self.http.get_capped(&url, self.timeout, MAX_BYTES).await {
            Ok(resp) => AdapterResult::Ok(String::from_utf8_lossy(&resp.body).into_owned()),
            Err(e) => {
                debug!(source = NAME, url = %url, error = %e, "robots.txt unavailable");
                AdapterResult::Ok(format!("not found ({})", e.cause()))
            }
        }
    }
}
