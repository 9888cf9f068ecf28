use regex::Regex;
use std::sync::OnceLock;

static SUSPICIOUS_PATH: OnceLock<Regex> = OnceLock::new();

fn suspicious_path() -> &'static Regex {
    SUSPICIOUS_PATH.get_or_init(|| {
        Regex::new(r"(?i)(admin|login|wp-admin|wp-login|phpmyadmin|backup|staging|test|old|private)")
            .expect("Valid Regex")
    })
}

/// Paths and sitemap pulled from a robots.txt body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsFacts {
    pub disallow: Vec<String>,
    pub sitemap: Option<String>,
    pub suspicious: Vec<String>,
}

/// Strips `prefix` (ASCII case-insensitive) from `line`, returning the
/// trimmed remainder.
fn directive<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(line[prefix.len()..].trim())
    } else {
        None
    }
}

pub fn parse_robots(text: &str) -> RobotsFacts {
    let lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let mut facts = RobotsFacts::default();
    for line in lines {
        if let Some(path) = directive(line, "disallow:") {
            facts.disallow.push(path.to_string());
        } else if let Some(map) = directive(line, "sitemap:") {
            if facts.sitemap.is_none() {
                facts.sitemap = Some(map.to_string());
            }
        }
    }
    facts.suspicious = facts
        .disallow
        .iter()
        .filter(|p| suspicious_path().is_match(p))
        .cloned()
        .collect();
    facts
}
