pub mod scan;
pub mod summarize;

use posture_core::{ScanSummary, Severity};

/// Whether the summary's risks breach `--fail-on-severity`. Prints the CI
/// verdict to stderr when they do.
pub fn breaches_threshold(summary: &ScanSummary, fail_on_severity: Option<Severity>) -> bool {
    let Some(min_level) = fail_on_severity else {
        return false;
    };
    let count = summary
        .risks
        .iter()
        .filter(|r| r.severity >= min_level)
        .count();
    if count == 0 {
        return false;
    }
    eprintln!(
        "CI failed: found {} risk(s) >= severity {} (max: {})",
        count, min_level, summary.worst_severity
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use posture_core::Finding;

    fn summary_with(severities: &[Severity]) -> ScanSummary {
        let risks: Vec<Finding> = severities
            .iter()
            .map(|s| Finding::new("r", *s, "risk"))
            .collect();
        ScanSummary {
            worst_severity: posture_core::worst_severity(&risks),
            risks,
            ..Default::default()
        }
    }

    #[test]
    fn no_threshold_never_fails() {
        assert!(!breaches_threshold(&summary_with(&[Severity::High]), None));
    }

    #[test]
    fn threshold_is_inclusive() {
        let s = summary_with(&[Severity::Low, Severity::Medium]);
        assert!(breaches_threshold(&s, Some(Severity::Medium)));
        assert!(!breaches_threshold(&s, Some(Severity::High)));
    }

    #[test]
    fn empty_risk_list_passes() {
        assert!(!breaches_threshold(&summary_with(&[]), Some(Severity::Info)));
    }
}
