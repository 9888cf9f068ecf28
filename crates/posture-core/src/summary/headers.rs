use crate::bag::HomePage;
use regex::Regex;
use std::sync::OnceLock;

/// Response headers every page is expected to send.
pub const SECURITY_HEADERS: [&str; 6] = [
    "strict-transport-security",
    "content-security-policy",
    "x-frame-options",
    "x-content-type-options",
    "referrer-policy",
    "permissions-policy",
];

pub const CDN_UNKNOWN: &str = "Unknown";

static GOOGLE_FRONTEND: OnceLock<Regex> = OnceLock::new();
static ORIGIN_SERVER: OnceLock<Regex> = OnceLock::new();

fn google_frontend() -> &'static Regex {
    GOOGLE_FRONTEND.get_or_init(|| Regex::new(r"(?i)google|gws").expect("Valid Regex"))
}

fn origin_server() -> &'static Regex {
    ORIGIN_SERVER.get_or_init(|| Regex::new(r"(?i)nginx|apache|iis").expect("Valid Regex"))
}

/// Splits the checklist into (present, missing). A header with an empty
/// value counts as missing. No page means everything is missing.
pub fn header_checklist(home: Option<&HomePage>) -> (Vec<String>, Vec<String>) {
    let mut present = Vec::new();
    let mut missing = Vec::new();
    for name in SECURITY_HEADERS {
        let set = home
            .and_then(|h| h.header(name))
            .is_some_and(|v| !v.is_empty());
        if set {
            present.push(name.to_string());
        } else {
            missing.push(name.to_string());
        }
    }
    (present, missing)
}

/// Guesses the edge provider from response headers and the server
/// signature. First matching heuristic wins.
pub fn guess_cdn(home: Option<&HomePage>, server_signature: &str) -> String {
    let has = |name: &str| home.is_some_and(|h| h.has_header(name));

    let provider = if has("cf-ray") || has("cf-cache-status") {
        "Cloudflare"
    } else if has("x-amz-cf-pop") || server_signature.to_lowercase().contains("cloudfront") {
        "AWS CloudFront"
    } else if home
        .and_then(|h| h.header("server-timing"))
        .is_some_and(|v| v.contains("ak_"))
    {
        "Akamai (heuristic)"
    } else if google_frontend().is_match(server_signature) {
        "Google Frontend (heuristic)"
    } else if origin_server().is_match(server_signature) {
        "Origin (nginx/apache/iis)"
    } else {
        CDN_UNKNOWN
    };
    provider.to_string()
}
