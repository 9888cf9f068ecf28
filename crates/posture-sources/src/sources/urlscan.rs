use super::{endpoint, failed, Source};
use crate::error::SourceError;
use crate::net::{PollBudget, ReqwestHttpClient};
use posture_config::SourcesConfig;
use posture_core::{AdapterResult, Target, UrlScanOutcome};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

const NAME: &str = "urlscan";
const ERROR_PREFIX: &str = "urlscan request failed";
pub const PENDING_NOTE: &str = "urlscan job queued, try later";
const NOT_READY: u16 = 404;

/// Submits the target URL for a private scan and polls for the result.
#[derive(Clone, Debug)]
pub struct UrlScanSource {
    http: ReqwestHttpClient,
    base_url: String,
    api_key: Option<String>,
    request_timeout: Duration,
    poll_interval: Duration,
    poll_ceiling: Duration,
}

impl UrlScanSource {
    pub fn new(http: ReqwestHttpClient, config: &SourcesConfig) -> Self {
        Self {
            http,
            base_url: config.urlscan_url.clone(),
            api_key: config.urlscan_api_key.clone(),
            request_timeout: config.request_timeout(),
            poll_interval: config.poll_interval(),
            poll_ceiling: config.poll_ceiling(),
        }
    }

    async fn scan(&self, api_key: &str, url: &str) -> Result<UrlScanOutcome, SourceError> {
        let submit_url = endpoint(&self.base_url, "/api/v1/scan/");
        let body = json!({"url": url, "public": "false"});
        let job: Value = self
            .http
            .post_json(&submit_url, &[("API-Key", api_key)], &body, self.request_timeout)
            .await?;

        let uuid = job
            .get("uuid")
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| SourceError::InvalidResponse("submission returned no uuid".into()))?;
        let result_url = endpoint(&self.base_url, &format!("/api/v1/result/{}/", uuid));

        let budget = PollBudget::new(self.poll_ceiling, self.poll_interval);
        let mut polls = 0u32;
        while budget.wait().await {
            polls += 1;
            let timeout = budget.clamp(self.request_timeout);
            match self.http.get_json::<Value>(&result_url, &[], timeout).await {
                Ok(result) => {
                    debug!(source = NAME, uuid, polls, "result ready");
                    return Ok(UrlScanOutcome::Completed(result));
                }
                Err(e) if e.status() == Some(NOT_READY) => {
                    debug!(source = NAME, uuid, polls, "result not ready");
                }
                Err(e) => return Err(e),
            }
        }

        info!(source = NAME, uuid, polls, "poll ceiling reached, job still queued");
        Ok(UrlScanOutcome::Pending {
            note: PENDING_NOTE.to_string(),
            job,
        })
    }
}

#[async_trait::async_trait]
impl Source for UrlScanSource {
    type Output = UrlScanOutcome;

    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self, target: &Target) -> AdapterResult<UrlScanOutcome> {
        let Some(api_key) = self.api_key.as_deref() else {
            return AdapterResult::Skipped("no urlscan api key".to_string());
        };
        match self.scan(api_key, &target.url).await {
            Ok(outcome) => AdapterResult::Ok(outcome),
            Err(e) => failed(NAME, ERROR_PREFIX, e),
        }
    }
}
