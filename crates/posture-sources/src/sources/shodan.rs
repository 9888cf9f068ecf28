use super::{endpoint, failed, Source};
use crate::net::ReqwestHttpClient;
use posture_core::{AdapterResult, Target};
use serde_json::Value;
use std::time::Duration;

const NAME: &str = "shodan";
const ERROR_PREFIX: &str = "shodan failed";

/// Internet-exposure search. Only constructed when a key is configured.
#[derive(Clone, Debug)]
pub struct ShodanSource {
    http: ReqwestHttpClient,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl ShodanSource {
    pub fn new(http: ReqwestHttpClient, base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl Source for ShodanSource {
    type Output = Value;

    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self, target: &Target) -> AdapterResult<Value> {
        let url = endpoint(&self.base_url, "/shodan/host/search");
        let query = [("key", self.api_key.as_str()), ("query", target.domain.as_str())];
        match self.http.get_json(&url, &query, self.timeout).await {
            Ok(hits) => AdapterResult::Ok(hits),
            Err(e) => failed(NAME, ERROR_PREFIX, e),
        }
    }
}
