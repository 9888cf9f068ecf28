//! Normalized projection of a [`RawScanBag`].
//!
//! The summary is what gets persisted and rendered. It is a pure function of
//! the bag and the evaluation instant, so re-summarizing a stored bag at the
//! same instant reproduces the stored summary.

pub mod exposure;
pub mod headers;
pub mod tech;
pub mod tls;

use crate::bag::RawScanBag;
use crate::model::{Finding, Severity};
use crate::risk::{build_summary_risks, worst_severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use exposure::{parse_robots, RobotsFacts};
pub use headers::{guess_cdn, header_checklist, SECURITY_HEADERS};
pub use tech::{top_techs, urlscan_screenshot, urlscan_summary};
pub use tls::{is_weak_cipher, LegacyFailure};

pub const HEADLINE_SEPARATOR: &str = " • ";
const HEADLINE_LIBS: usize = 3;

pub const REC_HSTS: &str = "Enable HSTS with a long max-age and includeSubDomains.";
pub const REC_CSP: &str = "Add a strict Content-Security-Policy to reduce XSS risk.";
pub const REC_MODERN_TLS: &str = "Enable TLS 1.3 and strong ciphers; disable legacy protocols.";
pub const REC_WEAK_CIPHERS: &str = "Remove legacy ciphers (RC4/3DES/MD5/EXPORT).";
pub const REC_RENEW_CERT: &str = "Renew the TLS certificate soon.";
pub const REC_ROBOTS: &str = "Review robots.txt disallows for sensitive admin paths exposure.";

/// Certificates closer to expiry than this are flagged.
pub const CERT_EXPIRY_WARN_DAYS: i64 = 75;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanSummary {
    pub domain: String,
    pub url: String,
    pub headline: String,
    pub ssl_grade: String,
    pub worst_severity: Severity,

    // TLS
    pub ip_address: String,
    pub server_signature: String,
    pub protocols: Vec<String>,
    pub alpn_protocols: Option<String>,
    #[serde(rename = "modernTLS")]
    pub modern_tls: bool,
    pub endpoint_grades: Vec<String>,
    pub cert_issuer: String,
    pub cert_not_after: Option<String>,
    pub cert_days_left: Option<i64>,
    pub strongest_cipher: Option<String>,
    pub weak_ciphers: Vec<String>,
    pub legacy_failures: Vec<LegacyFailure>,

    // Headers
    pub home_status: Option<u16>,
    pub present_headers: Vec<String>,
    pub missing_headers: Vec<String>,

    // Tech
    pub libs: Vec<String>,
    pub techs: Vec<String>,
    pub generator: Option<String>,

    // Exposure
    pub subdomain_count: usize,
    pub subdomains: Vec<String>,
    pub robots: String,
    pub robots_disallow: Vec<String>,
    pub sitemap: Option<String>,
    pub suspicious_disallows: Vec<String>,

    pub risks: Vec<Finding>,
    pub recommendations: Vec<String>,

    pub urlscan_summary: Option<String>,
    pub urlscan_screenshot: Option<String>,
    pub cdn_provider: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawScanBag>,
}

impl ScanSummary {
    /// Whether the home page was fetched, i.e. the header checklist reflects
    /// a real response.
    pub fn page_fetched(&self) -> bool {
        self.home_status.is_some()
    }

    pub fn is_missing_header(&self, name: &str) -> bool {
        self.missing_headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case(name))
    }
}

pub fn summarize(bag: &RawScanBag) -> ScanSummary {
    summarize_at(bag, Utc::now())
}

pub fn summarize_at(bag: &RawScanBag, now: DateTime<Utc>) -> ScanSummary {
    let home = bag.home_page();
    let tls = tls::tls_facts(bag.ssl.ok(), home, now);
    let (present_headers, missing_headers) = header_checklist(home);
    let cdn_provider = guess_cdn(home, &tls.server_signature);

    let robots = bag.robots_text().trim().to_string();
    let robots_facts = parse_robots(&robots);
    let subdomains = bag.subdomains().to_vec();
    let libs = home
        .and_then(|h| h.detected_libs.clone())
        .unwrap_or_default();

    let domain = [bag.domain.as_str(), bag.url.as_str()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string();

    let mut summary = ScanSummary {
        domain,
        url: bag.url.clone(),
        headline: String::new(),
        ssl_grade: tls.grade,
        worst_severity: Severity::Info,

        ip_address: tls.ip_address,
        server_signature: tls.server_signature,
        protocols: tls.protocols,
        alpn_protocols: tls.alpn_protocols,
        modern_tls: tls.modern_tls,
        endpoint_grades: tls.endpoint_grades,
        cert_issuer: tls.cert_issuer,
        cert_not_after: tls.cert_not_after,
        cert_days_left: tls.cert_days_left,
        strongest_cipher: tls.strongest_cipher,
        weak_ciphers: tls.weak_ciphers,
        legacy_failures: tls.legacy_failures,

        home_status: home.map(|h| h.status),
        present_headers,
        missing_headers,

        libs,
        techs: top_techs(bag),
        generator: home.and_then(|h| h.generator.clone()),

        subdomain_count: subdomains.len(),
        subdomains,
        robots,
        robots_disallow: robots_facts.disallow,
        sitemap: robots_facts.sitemap,
        suspicious_disallows: robots_facts.suspicious,

        risks: Vec::new(),
        recommendations: Vec::new(),

        urlscan_summary: urlscan_summary(bag),
        urlscan_screenshot: urlscan_screenshot(bag),
        cdn_provider,

        raw: Some(bag.clone()),
    };

    summary.headline = headline(&summary);
    summary.recommendations = recommendations(&summary);
    summary.risks = build_summary_risks(&summary);
    summary.worst_severity = worst_severity(&summary.risks);
    summary
}

fn headline(s: &ScanSummary) -> String {
    let mut parts = vec![format!("Grade {}", s.ssl_grade)];
    if s.modern_tls {
        parts.push("TLS 1.3".to_string());
    }
    if !s.libs.is_empty() {
        let shown = s
            .libs
            .iter()
            .take(HEADLINE_LIBS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let more = if s.libs.len() > HEADLINE_LIBS { "…" } else { "" };
        parts.push(format!("Tech: {}{}", shown, more));
    }
    let plural = if s.subdomain_count == 1 { "" } else { "s" };
    parts.push(format!("{} subdomain{}", s.subdomain_count, plural));
    parts.join(HEADLINE_SEPARATOR)
}

fn recommendations(s: &ScanSummary) -> Vec<String> {
    let cert_expiring = s
        .cert_days_left
        .is_some_and(|d| d < CERT_EXPIRY_WARN_DAYS);
    [
        (s.is_missing_header("strict-transport-security"), REC_HSTS),
        (s.is_missing_header("content-security-policy"), REC_CSP),
        (!s.modern_tls, REC_MODERN_TLS),
        (!s.weak_ciphers.is_empty(), REC_WEAK_CIPHERS),
        (cert_expiring, REC_RENEW_CERT),
        (!s.suspicious_disallows.is_empty(), REC_ROBOTS),
    ]
    .into_iter()
    .filter(|(applies, _)| *applies)
    .map(|(_, text)| text.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_pluralizes_and_truncates() {
        let s = ScanSummary {
            ssl_grade: "A".into(),
            modern_tls: true,
            libs: vec!["jquery".into(), "react".into(), "vue".into(), "angular".into()],
            subdomain_count: 1,
            ..Default::default()
        };
        assert_eq!(
            headline(&s),
            "Grade A • TLS 1.3 • Tech: jquery, react, vue… • 1 subdomain"
        );

        let s = ScanSummary {
            ssl_grade: "unknown".into(),
            ..Default::default()
        };
        assert_eq!(headline(&s), "Grade unknown • 0 subdomains");
    }

    #[test]
    fn recommendations_keep_fixed_order() {
        let s = ScanSummary {
            missing_headers: vec!["content-security-policy".into()],
            modern_tls: true,
            weak_ciphers: vec!["TLS_RSA_WITH_RC4_128_SHA".into()],
            cert_days_left: Some(10),
            suspicious_disallows: vec!["/admin".into()],
            ..Default::default()
        };
        assert_eq!(
            recommendations(&s),
            vec![REC_CSP, REC_WEAK_CIPHERS, REC_RENEW_CERT, REC_ROBOTS]
        );
    }

    #[test]
    fn empty_bag_summarizes_to_defaults() {
        let bag = RawScanBag {
            domain: "example.com".into(),
            url: "https://example.com/".into(),
            ..Default::default()
        };
        let s = summarize(&bag);
        assert_eq!(s.ssl_grade, "unknown");
        assert_eq!(s.ip_address, "n/a");
        assert_eq!(s.cert_issuer, "n/a");
        assert_eq!(s.cdn_provider, "Unknown");
        assert_eq!(s.home_status, None);
        assert_eq!(s.missing_headers.len(), SECURITY_HEADERS.len());
        assert!(s.risks.is_empty());
        assert_eq!(s.worst_severity, Severity::Info);
        assert_eq!(s.raw.as_ref(), Some(&bag));
    }
}
