use crate::error::SourceError;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

const MAX_REDIRECTS: usize = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A fully read response whose body stayed under the size cap.
#[derive(Debug, Clone)]
pub struct CappedResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl CappedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Shared HTTP client for every adapter. Cloning is cheap; all clones share
/// one connection pool.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(user_agent: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<T, SourceError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await?;
        Self::json_body(resp).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &B,
        timeout: Duration,
    ) -> Result<T, SourceError> {
        let mut req = self.client.post(url).json(body).timeout(timeout);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let resp = req.send().await?;
        Self::json_body(resp).await
    }

    /// GET that streams the body and aborts once it grows past `max_bytes`.
    pub async fn get_capped(
        &self,
        url: &str,
        timeout: Duration,
        max_bytes: u64,
    ) -> Result<CappedResponse, SourceError> {
        let mut resp = self.client.get(url).timeout(timeout).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::http_status(status, String::new()));
        }
        if resp.content_length().is_some_and(|len| len > max_bytes) {
            return Err(SourceError::TooLarge { limit: max_bytes });
        }

        let headers = flatten_headers(resp.headers());
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            if (body.len() + chunk.len()) as u64 > max_bytes {
                return Err(SourceError::TooLarge { limit: max_bytes });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(CappedResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }

    async fn json_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, SourceError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::http_status(status, body));
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Lower-cased header names; repeated headers are joined with ", ".
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for name in headers.keys() {
        let values: Vec<String> = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        out.insert(name.as_str().to_ascii_lowercase(), values.join(", "));
    }
    out
}
