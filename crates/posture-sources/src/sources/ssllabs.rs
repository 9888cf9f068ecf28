use super::{endpoint, failed, Source};
use crate::error::SourceError;
use crate::net::{PollBudget, ReqwestHttpClient};
use posture_config::SourcesConfig;
use posture_core::{AdapterResult, SslJob, Target};
use std::time::Duration;
use tracing::{debug, info};

const NAME: &str = "ssl";
const ERROR_PREFIX: &str = "ssllabs analysis failed";
const ANALYZE_PATH: &str = "/api/v3/analyze";

/// Asynchronous TLS grading job: one submit, then polls until the job is
/// terminal or the ceiling passes.
#[derive(Clone, Debug)]
pub struct SslLabsSource {
    http: ReqwestHttpClient,
    base_url: String,
    request_timeout: Duration,
    poll_interval: Duration,
    poll_ceiling: Duration,
}

impl SslLabsSource {
    pub fn new(http: ReqwestHttpClient, config: &SourcesConfig) -> Self {
        Self {
            http,
            base_url: config.ssllabs_url.clone(),
            request_timeout: config.request_timeout(),
            poll_interval: config.poll_interval(),
            poll_ceiling: config.poll_ceiling(),
        }
    }

    async fn analyze(&self, host: &str) -> Result<SslJob, SourceError> {
        let url = endpoint(&self.base_url, ANALYZE_PATH);
        let budget = PollBudget::new(self.poll_ceiling, self.poll_interval);

        let mut job: SslJob = self
            .http
            .get_json(&url, &[("host", host), ("all", "done")], self.request_timeout)
            .await?;

        let mut polls = 0u32;
        while !job.is_terminal() && budget.wait().await {
            let timeout = budget.clamp(self.request_timeout);
            let update: SslJob = self.http.get_json(&url, &[("host", host)], timeout).await?;
            polls += 1;
            debug!(source = NAME, host, polls, status = ?update.status, "poll");
            job.merge(update);
        }

        if !job.is_terminal() {
            info!(source = NAME, host, polls, "poll ceiling reached, returning latest job");
        }
        Ok(job)
    }
}

#[async_trait::async_trait]
impl Source for SslLabsSource {
    type Output = SslJob;

    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self, target: &Target) -> AdapterResult<SslJob> {
        match self.analyze(&target.domain).await {
            Ok(job) => AdapterResult::Ok(job),
            Err(e) => failed(NAME, ERROR_PREFIX, e),
        }
    }
}
