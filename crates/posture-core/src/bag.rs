use crate::model::Finding;
use crate::ssl::SslJob;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Source names, in the order the orchestrator reports them.
pub const SOURCE_NAMES: [&str; 7] = [
    "crtsh",
    "home",
    "robots",
    "ssl",
    "urlscan",
    "builtwith",
    "shodan",
];

/// Outcome of one source adapter. Failures are data, never panics or
/// propagated errors.
///
/// Serialized as `{"ok": ...}`, `{"error": "..."}` or `{"skipped": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterResult<T> {
    Ok(T),
    Error(String),
    Skipped(String),
}

impl<T> AdapterResult<T> {
    pub fn ok(&self) -> Option<&T> {
        match self {
            AdapterResult::Ok(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AdapterResult::Ok(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AdapterResult::Error(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, AdapterResult::Skipped(_))
    }

    pub fn error_reason(&self) -> Option<&str> {
        match self {
            AdapterResult::Error(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> AdapterResult<U> {
        match self {
            AdapterResult::Ok(v) => AdapterResult::Ok(f(v)),
            AdapterResult::Error(e) => AdapterResult::Error(e),
            AdapterResult::Skipped(s) => AdapterResult::Skipped(s),
        }
    }
}

/// Slots missing from a deserialized bag read as "not collected".
impl<T> Default for AdapterResult<T> {
    fn default() -> Self {
        AdapterResult::Skipped("not collected".to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrtShData {
    #[serde(default)]
    pub subdomains: Vec<String>,
}

/// Home page fetch: status, lower-cased response headers and, for HTML
/// bodies only, the fingerprint fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomePage {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_libs: Option<Vec<String>>,
}

impl HomePage {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }
}

/// urlscan-style lookup: either the finished result document or, when the
/// poll ceiling was reached first, the submitted job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlScanOutcome {
    Pending { note: String, job: Value },
    Completed(Value),
}

impl UrlScanOutcome {
    pub fn completed(&self) -> Option<&Value> {
        match self {
            UrlScanOutcome::Completed(v) => Some(v),
            UrlScanOutcome::Pending { .. } => None,
        }
    }
}

/// Everything collected for one target by one fan-out. Immutable after the
/// orchestrator assembles it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawScanBag {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub crtsh: AdapterResult<CrtShData>,
    #[serde(default)]
    pub home: AdapterResult<HomePage>,
    #[serde(default)]
    pub robots: AdapterResult<String>,
    #[serde(default)]
    pub ssl: AdapterResult<SslJob>,
    #[serde(default)]
    pub urlscan: AdapterResult<UrlScanOutcome>,
    #[serde(default)]
    pub builtwith: AdapterResult<Value>,
    /// `None` when no Shodan key is configured.
    #[serde(default)]
    pub shodan: Option<AdapterResult<Value>>,
}

impl RawScanBag {
    pub fn home_page(&self) -> Option<&HomePage> {
        self.home.ok()
    }

    pub fn subdomains(&self) -> &[String] {
        self.crtsh
            .ok()
            .map(|c| c.subdomains.as_slice())
            .unwrap_or(&[])
    }

    /// Robots text, or empty when the slot holds no text.
    pub fn robots_text(&self) -> &str {
        self.robots.ok().map(|s| s.as_str()).unwrap_or("")
    }
}

/// Response of a live scan: the bag plus the cheap raw-bag risk pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveScan {
    #[serde(flatten)]
    pub bag: RawScanBag,
    pub risks: Vec<Finding>,
}
