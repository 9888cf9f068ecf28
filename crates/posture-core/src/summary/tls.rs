use crate::bag::HomePage;
use crate::extract::{first_match, scalar_text, Strategy};
use crate::ssl::{CertChain, Endpoint, SslJob, Suite};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

const MS_PER_DAY: f64 = 86_400_000.0;

static WEAK_CIPHER: OnceLock<Regex> = OnceLock::new();

fn weak_cipher_pattern() -> &'static Regex {
    WEAK_CIPHER.get_or_init(|| {
        Regex::new(r"(?i)(RC4|3DES|NULL|EXPORT|MD5|DES|TLS_RSA_)").expect("Valid Regex")
    })
}

pub fn is_weak_cipher(name: &str) -> bool {
    weak_cipher_pattern().is_match(name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyFailure {
    pub client: String,
    pub error: String,
}

/// TLS-derived part of the summary. Everything comes from the first
/// endpoint of the grading job, except `endpoint_grades`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TlsFacts {
    pub grade: String,
    pub endpoint_grades: Vec<String>,
    pub ip_address: String,
    pub server_signature: String,
    pub protocols: Vec<String>,
    pub alpn_protocols: Option<String>,
    pub modern_tls: bool,
    pub cert_issuer: String,
    pub cert_not_after: Option<String>,
    pub cert_days_left: Option<i64>,
    pub strongest_cipher: Option<String>,
    pub weak_ciphers: Vec<String>,
    pub legacy_failures: Vec<LegacyFailure>,
}

struct TlsSources<'a> {
    endpoint: Option<&'a Endpoint>,
    home: Option<&'a HomePage>,
}

pub(crate) fn tls_facts(job: Option<&SslJob>, home: Option<&HomePage>, now: DateTime<Utc>) -> TlsFacts {
    let endpoint = job.and_then(SslJob::first_endpoint);
    let details = endpoint.and_then(|e| e.details.as_ref());
    let sources = TlsSources { endpoint, home };

    let ip_strategies: [Strategy<TlsSources<'_>, String>; 2] = [
        ("endpoint.ipAddress", |s| s.endpoint?.ip_address.clone()),
        ("endpoint.ipv6", |s| s.endpoint?.ipv6.clone()),
    ];
    let signature_strategies: [Strategy<TlsSources<'_>, String>; 2] = [
        ("endpoint.details.serverSignature", |s| {
            s.endpoint?.details.as_ref()?.server_signature.clone()
        }),
        ("home.headers.server", |s| {
            s.home?.header("server").map(str::to_string)
        }),
    ];
    let issuer_strategies: [Strategy<CertChain, String>; 2] = [
        ("certIssuerLabel", |c| c.cert_issuer_label.clone()),
        ("issuerLabel", |c| c.issuer_label.clone()),
    ];
    let not_after_strategies: [Strategy<CertChain, Value>; 2] = [
        ("notAfter", |c| c.not_after.clone().filter(|v| !v.is_null())),
        ("validityNotAfter", |c| {
            c.validity_not_after.clone().filter(|v| !v.is_null())
        }),
    ];

    let grade = endpoint
        .and_then(|e| e.grade.clone())
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let endpoint_grades = job
        .map(|j| {
            j.endpoints()
                .iter()
                .filter_map(|e| e.grade.clone())
                .filter(|g| !g.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let protocols: Vec<String> = details
        .map(|d| {
            d.protocols
                .iter()
                .map(|p| {
                    format!(
                        "{} {}",
                        p.name.as_deref().unwrap_or(""),
                        p.version.as_deref().unwrap_or("")
                    )
                    .trim()
                    .to_string()
                })
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let modern_tls = protocols.iter().any(|p| p.contains("1.3"));

    let first_chain = details.and_then(|d| d.cert_chains.first());
    let cert_issuer = first_chain
        .and_then(|c| first_match(c, &issuer_strategies))
        .unwrap_or_else(|| "n/a".to_string());
    let not_after_raw = first_chain.and_then(|c| first_match(c, &not_after_strategies));
    let not_after = not_after_raw.as_ref().and_then(parse_instant);
    let cert_not_after = match (&not_after, &not_after_raw) {
        (Some(t), _) => Some(t.to_rfc3339()),
        (None, Some(raw)) => scalar_text(raw),
        (None, None) => None,
    };
    let cert_days_left = not_after.map(|t| days_until(t, now));

    let suites: Vec<&Suite> = details
        .map(|d| d.suites.iter().flat_map(|g| g.list.iter()).collect())
        .unwrap_or_default();

    let legacy_failures = details
        .and_then(|d| d.sims.as_ref())
        .map(|sims| {
            sims.results
                .iter()
                .filter_map(|r| {
                    let error = r.error_message.clone().filter(|m| !m.is_empty())?;
                    let client = r.client.as_ref();
                    let name = client
                        .and_then(|c| c.name.clone())
                        .unwrap_or_else(|| "Client".to_string());
                    let version = client
                        .and_then(|c| c.version.as_ref())
                        .and_then(scalar_text)
                        .unwrap_or_default();
                    Some(LegacyFailure {
                        client: format!("{} {}", name, version).trim().to_string(),
                        error,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    TlsFacts {
        grade,
        endpoint_grades,
        ip_address: first_match(&sources, &ip_strategies).unwrap_or_else(|| "n/a".to_string()),
        server_signature: first_match(&sources, &signature_strategies)
            .unwrap_or_else(|| "n/a".to_string()),
        protocols,
        alpn_protocols: details.and_then(|d| d.alpn_protocols.clone()),
        modern_tls,
        cert_issuer,
        cert_not_after,
        cert_days_left,
        strongest_cipher: strongest_cipher(&suites),
        weak_ciphers: weak_ciphers(&suites),
        legacy_failures,
    }
}

/// Suite with the highest `cipherStrength` (missing counts as 0). Ties keep
/// the earliest suite in list order.
pub(crate) fn strongest_cipher(suites: &[&Suite]) -> Option<String> {
    let mut best: Option<&Suite> = None;
    for suite in suites {
        let strength = suite.cipher_strength.unwrap_or(0);
        match best {
            Some(b) if b.cipher_strength.unwrap_or(0) >= strength => {}
            _ => best = Some(suite),
        }
    }
    best.and_then(|s| s.name.clone())
}

pub(crate) fn weak_ciphers(suites: &[&Suite]) -> Vec<String> {
    suites
        .iter()
        .filter_map(|s| s.name.as_deref())
        .filter(|name| is_weak_cipher(name))
        .map(str::to_string)
        .collect()
}

/// Days remaining, rounded up: a certificate expiring in 73.2 days has 74
/// days left.
pub(crate) fn days_until(t: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (t - now).num_milliseconds() as f64;
    (ms / MS_PER_DAY).ceil() as i64
}

/// Accepts epoch milliseconds (number or digit string), RFC 3339, RFC 2822
/// or a bare `YYYY-MM-DD` date.
pub(crate) fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ms) = s.parse::<i64>() {
                return Utc.timestamp_millis_opt(ms).single();
            }
            if let Ok(t) = DateTime::parse_from_rfc3339(s) {
                return Some(t.with_timezone(&Utc));
            }
            if let Ok(t) = DateTime::parse_from_rfc2822(s) {
                return Some(t.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn suite(name: &str, strength: Option<u32>) -> Suite {
        Suite {
            name: Some(name.to_string()),
            cipher_strength: strength,
            ..Default::default()
        }
    }

    #[test]
    fn weak_cipher_pattern_examples() {
        assert!(is_weak_cipher("TLS_RSA_WITH_3DES_EDE_CBC_SHA"));
        assert!(is_weak_cipher("tls_ecdhe_rsa_with_rc4_128_sha"));
        assert!(!is_weak_cipher("TLS_AES_128_GCM_SHA256"));
        assert!(!is_weak_cipher("TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384"));
    }

    #[test]
    fn strongest_cipher_keeps_first_on_tie() {
        let a = suite("FIRST_256", Some(256));
        let b = suite("SECOND_256", Some(256));
        let c = suite("WEAKER_128", Some(128));
        assert_eq!(
            strongest_cipher(&[&c, &a, &b]),
            Some("FIRST_256".to_string())
        );
    }

    #[test]
    fn strongest_cipher_treats_missing_strength_as_zero() {
        let a = suite("UNKNOWN", None);
        let b = suite("KNOWN", Some(1));
        assert_eq!(strongest_cipher(&[&a, &b]), Some("KNOWN".to_string()));
        assert_eq!(strongest_cipher(&[]), None);
    }

    #[test]
    fn days_until_rounds_up() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(days_until(now + Duration::days(74), now), 74);
        assert_eq!(days_until(now + Duration::hours(73 * 24 + 1), now), 74);
        assert_eq!(days_until(now - Duration::hours(12), now), 0);
    }

    #[test]
    fn parses_supported_instant_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let ms = expected.timestamp_millis();
        assert_eq!(parse_instant(&json!(ms)), Some(expected));
        assert_eq!(parse_instant(&json!(ms.to_string())), Some(expected));
        assert_eq!(parse_instant(&json!("2025-03-01T00:00:00Z")), Some(expected));
        assert_eq!(parse_instant(&json!("2025-03-01")), Some(expected));
        assert_eq!(parse_instant(&json!("soon")), None);
        assert_eq!(parse_instant(&json!(null)), None);
    }
}
