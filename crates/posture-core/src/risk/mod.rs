//! Risk Engine: a fixed, ordered rule table evaluated against normalized
//! facts.
//!
//! Two passes exist. The live pass runs on a raw bag right after a scan and
//! evaluates only the rules whose inputs are cheap to read from the bag. The
//! summary pass runs on a [`ScanSummary`] and additionally evaluates the
//! certificate and cipher rules. Findings are emitted in table order; more
//! than one rule may fire and the output is not sorted by severity.

use crate::bag::RawScanBag;
use crate::model::{Finding, Severity};
use crate::summary::{ScanSummary, CERT_EXPIRY_WARN_DAYS};

pub const RULE_MISSING_HSTS: &str = "missing_hsts";
pub const RULE_MISSING_CSP: &str = "missing_csp";
pub const RULE_CMS_DETECTED: &str = "cms_detected";
pub const RULE_MANY_SUBDOMAINS: &str = "many_subdomains";
pub const RULE_WEAK_SSL: &str = "weak_ssl";
pub const RULE_CERT_EXPIRY_SOON: &str = "cert_expiry_soon";
pub const RULE_WEAK_CIPHERS: &str = "weak_ciphers";

pub const MANY_SUBDOMAINS_THRESHOLD: usize = 10;
const WEAK_CIPHERS_SHOWN: usize = 5;

/// Grades that sort before this one (as plain strings) are reported weak.
pub const WEAK_GRADE_BOUNDARY: &str = "B";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskPass {
    Live,
    Summary,
}

/// Inputs the rules read, collected from either a bag or a summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskFacts {
    pub page_fetched: bool,
    pub hsts_missing: bool,
    pub csp_missing: bool,
    pub generator: Option<String>,
    pub subdomain_count: usize,
    pub grades: Vec<String>,
    pub cert_days_left: Option<i64>,
    pub weak_ciphers: Vec<String>,
}

impl RiskFacts {
    pub fn from_bag(bag: &RawScanBag) -> Self {
        let home = bag.home_page();
        let missing = |name: &str| {
            home.is_some_and(|h| h.header(name).map_or(true, str::is_empty))
        };
        let grades = bag
            .ssl
            .ok()
            .map(|job| {
                job.endpoints()
                    .iter()
                    .filter_map(|e| e.grade.clone())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            page_fetched: home.is_some(),
            hsts_missing: missing("strict-transport-security"),
            csp_missing: missing("content-security-policy"),
            generator: home.and_then(|h| h.generator.clone()),
            subdomain_count: bag.subdomains().len(),
            grades,
            cert_days_left: None,
            weak_ciphers: Vec::new(),
        }
    }

    pub fn from_summary(summary: &ScanSummary) -> Self {
        let fetched = summary.page_fetched();
        Self {
            page_fetched: fetched,
            hsts_missing: fetched && summary.is_missing_header("strict-transport-security"),
            csp_missing: fetched && summary.is_missing_header("content-security-policy"),
            generator: summary.generator.clone(),
            subdomain_count: summary.subdomain_count,
            grades: summary.endpoint_grades.clone(),
            cert_days_left: summary.cert_days_left,
            weak_ciphers: summary.weak_ciphers.clone(),
        }
    }
}

pub struct RiskRule {
    pub id: &'static str,
    pub severity: Severity,
    /// The earliest pass that evaluates this rule; summary-only rules are
    /// skipped by the live pass.
    pub pass: RiskPass,
    /// Returns the finding message when the rule fires.
    pub check: fn(&RiskFacts) -> Option<String>,
}

pub static RULES: [RiskRule; 7] = [
    RiskRule {
        id: RULE_MISSING_HSTS,
        severity: Severity::Medium,
        pass: RiskPass::Live,
        check: check_missing_hsts,
    },
    RiskRule {
        id: RULE_MISSING_CSP,
        severity: Severity::Medium,
        pass: RiskPass::Live,
        check: check_missing_csp,
    },
    RiskRule {
        id: RULE_CMS_DETECTED,
        severity: Severity::Info,
        pass: RiskPass::Live,
        check: check_cms,
    },
    RiskRule {
        id: RULE_MANY_SUBDOMAINS,
        severity: Severity::Low,
        pass: RiskPass::Live,
        check: check_many_subdomains,
    },
    RiskRule {
        id: RULE_WEAK_SSL,
        severity: Severity::High,
        pass: RiskPass::Live,
        check: check_weak_ssl,
    },
    RiskRule {
        id: RULE_CERT_EXPIRY_SOON,
        severity: Severity::High,
        pass: RiskPass::Summary,
        check: check_cert_expiry,
    },
    RiskRule {
        id: RULE_WEAK_CIPHERS,
        severity: Severity::Medium,
        pass: RiskPass::Summary,
        check: check_weak_ciphers,
    },
];

fn check_missing_hsts(f: &RiskFacts) -> Option<String> {
    (f.page_fetched && f.hsts_missing).then(|| "HSTS header missing".to_string())
}

fn check_missing_csp(f: &RiskFacts) -> Option<String> {
    (f.page_fetched && f.csp_missing).then(|| "CSP header missing".to_string())
}

fn check_cms(f: &RiskFacts) -> Option<String> {
    f.generator
        .as_deref()
        .filter(|g| !g.is_empty())
        .map(|g| format!("CMS/Generator: {}", g))
}

fn check_many_subdomains(f: &RiskFacts) -> Option<String> {
    (f.subdomain_count >= MANY_SUBDOMAINS_THRESHOLD)
        .then(|| format!("Found {} subdomains", f.subdomain_count))
}

/// Plain string ordering against [`WEAK_GRADE_BOUNDARY`]. Note that this
/// flags "A", "A+" and "A-" while "C" through "F" sort after "B"; stored
/// reports depend on this ordering.
pub fn is_weak_grade(grade: &str) -> bool {
    !grade.is_empty() && grade < WEAK_GRADE_BOUNDARY
}

fn check_weak_ssl(f: &RiskFacts) -> Option<String> {
    f.grades
        .iter()
        .any(|g| is_weak_grade(g))
        .then(|| "One or more endpoints have weak SSL grade".to_string())
}

fn check_cert_expiry(f: &RiskFacts) -> Option<String> {
    f.cert_days_left
        .filter(|d| *d < CERT_EXPIRY_WARN_DAYS)
        .map(|d| format!("Certificate expires in {} days", d))
}

fn check_weak_ciphers(f: &RiskFacts) -> Option<String> {
    if f.weak_ciphers.is_empty() {
        return None;
    }
    let shown = f
        .weak_ciphers
        .iter()
        .take(WEAK_CIPHERS_SHOWN)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let more = if f.weak_ciphers.len() > WEAK_CIPHERS_SHOWN {
        "…"
    } else {
        ""
    };
    Some(format!("Weak ciphers detected: {}{}", shown, more))
}

pub fn evaluate(facts: &RiskFacts, pass: RiskPass) -> Vec<Finding> {
    RULES
        .iter()
        .filter(|rule| pass == RiskPass::Summary || rule.pass == RiskPass::Live)
        .filter_map(|rule| (rule.check)(facts).map(|msg| Finding::new(rule.id, rule.severity, msg)))
        .collect()
}

/// Live pass over a freshly collected bag.
pub fn build_live_risks(bag: &RawScanBag) -> Vec<Finding> {
    evaluate(&RiskFacts::from_bag(bag), RiskPass::Live)
}

/// Full pass over a summary. Ignores `summary.risks`, so re-running it on
/// its own output is a no-op.
pub fn build_summary_risks(summary: &ScanSummary) -> Vec<Finding> {
    evaluate(&RiskFacts::from_summary(summary), RiskPass::Summary)
}

/// Highest severity present, `Info` for an empty list.
pub fn worst_severity(findings: &[Finding]) -> Severity {
    findings
        .iter()
        .map(|f| f.severity)
        .max()
        .unwrap_or(Severity::Info)
}
