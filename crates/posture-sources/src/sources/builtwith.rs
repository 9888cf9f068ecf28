use super::{endpoint, failed, Source};
use crate::net::ReqwestHttpClient;
use posture_config::SourcesConfig;
use posture_core::{AdapterResult, Target};
use serde_json::Value;
use std::time::Duration;

const NAME: &str = "builtwith";
const ERROR_PREFIX: &str = "builtwith request failed";

/// Technology-profile lookup. A no-op without an API key.
#[derive(Clone, Debug)]
pub struct BuiltWithSource {
    http: ReqwestHttpClient,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl BuiltWithSource {
    pub fn new(http: ReqwestHttpClient, config: &SourcesConfig) -> Self {
        Self {
            http,
            base_url: config.builtwith_url.clone(),
            api_key: config.builtwith_api_key.clone(),
            timeout: config.request_timeout(),
        }
    }
}

#[async_trait::async_trait]
impl Source for BuiltWithSource {
    type Output = Value;

    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self, target: &Target) -> AdapterResult<Value> {
        let Some(key) = self.api_key.as_deref() else {
            return AdapterResult::Skipped("no builtwith api key".to_string());
        };
        let url = endpoint(&self.base_url, "/free1/api.json");
        let query = [("KEY", key), ("LOOKUP", target.domain.as_str())];
        match self.http.get_json(&url, &query, self.timeout).await {
            Ok(profile) => AdapterResult::Ok(profile),
            Err(e) => failed(NAME, ERROR_PREFIX, e),
        }
    }
}
