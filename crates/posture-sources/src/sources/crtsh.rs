use super::{endpoint, failed, Source};
use crate::net::ReqwestHttpClient;
use posture_config::SourcesConfig;
use posture_core::{AdapterResult, CrtShData, Target};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

const NAME: &str = "crtsh";
const ERROR_PREFIX: &str = "crt.sh request failed";

#[derive(Debug, Deserialize)]
struct CertEntry {
    #[serde(default)]
    name_value: Option<String>,
}

/// Certificate-transparency subdomain lookup.
#[derive(Clone, Debug)]
pub struct CrtShSource {
    http: ReqwestHttpClient,
    base_url: String,
    timeout: Duration,
}

impl CrtShSource {
    pub fn new(http: ReqwestHttpClient, config: &SourcesConfig) -> Self {
        Self {
            http,
            base_url: config.crtsh_url.clone(),
            timeout: config.crtsh_timeout(),
        }
    }
}

/// Splits newline-joined `name_value` fields, trims, drops empties and
/// deduplicates keeping first-seen order.
fn collect_subdomains(entries: &[CertEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(|e| e.name_value.as_deref())
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_string()))
        .map(str::to_string)
        .collect()
}

#[async_trait::async_trait]
impl Source for CrtShSource {
    type Output = CrtShData;

    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self, target: &Target) -> AdapterResult<CrtShData> {
        let url = endpoint(&self.base_url, "/");
        let pattern = format!("%.{}", target.domain);
        let query = [("q", pattern.as_str()), ("output", "json")];

        match self
            .http
            .get_json::<Vec<CertEntry>>(&url, &query, self.timeout)
            .await
        {
            Ok(entries) => {
                let subdomains = collect_subdomains(&entries);
                debug!(
                    source = NAME,
                    entries = entries.len(),
                    subdomains = subdomains.len(),
                    "ct lookup done"
                );
                AdapterResult::Ok(CrtShData { subdomains })
            }
            Err(e) => failed(NAME, ERROR_PREFIX, e),
        }
    }
}
