use colored::{ColoredString, Colorize};
use posture_core::{ScanSummary, Severity};
use std::fmt::Write;

fn severity_label(severity: Severity) -> ColoredString {
    let label = severity.to_string();
    match severity {
        Severity::Info => label.normal(),
        Severity::Low => label.yellow(),
        Severity::Medium => label.truecolor(255, 165, 0), // Orange
        Severity::High => label.red(),
        Severity::Critical => label.red().bold().on_black(),
    }
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title.bold().underline());
}

pub fn render_text(s: &ScanSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", "Posture Report:".bold(), s.domain.cyan());
    let _ = writeln!(out, "  URL:            {}", or_dash(&s.url));
    let _ = writeln!(out, "  Headline:       {}", or_dash(&s.headline));
    let _ = writeln!(out, "  Worst Severity: {}", severity_label(s.worst_severity));

    section(&mut out, "TLS Summary");
    let _ = writeln!(out, "  SSL Grade:        {}", or_dash(&s.ssl_grade));
    let _ = writeln!(out, "  IP Address:       {}", or_dash(&s.ip_address));
    let _ = writeln!(out, "  Server Signature: {}", or_dash(&s.server_signature));
    let _ = writeln!(out, "  CDN:              {}", or_dash(&s.cdn_provider));
    let _ = writeln!(
        out,
        "  Modern TLS:       {}",
        if s.modern_tls { "Yes".green() } else { "No".yellow() }
    );
    let _ = writeln!(out, "  Protocols:        {}", list(&s.protocols));
    let _ = writeln!(
        out,
        "  Strongest Cipher: {}",
        s.strongest_cipher.as_deref().unwrap_or("n/a")
    );
    if !s.weak_ciphers.is_empty() {
        let _ = writeln!(out, "  Weak Ciphers:     {}", list(&s.weak_ciphers).red());
    }
    if let Some(days) = s.cert_days_left {
        let _ = writeln!(
            out,
            "  Certificate:      {} ({} days left)",
            or_dash(&s.cert_issuer),
            days
        );
    }

    section(&mut out, "Security Headers");
    let _ = writeln!(out, "  Present: {}", list(&s.present_headers).green());
    let _ = writeln!(out, "  Missing: {}", list(&s.missing_headers).yellow());

    section(&mut out, "Technologies");
    let _ = writeln!(out, "  Detected JS libs: {}", list(&s.libs));
    let _ = writeln!(out, "  Top Tech:         {}", list(&s.techs));
    if let Some(generator) = &s.generator {
        let _ = writeln!(out, "  Generator:        {}", generator);
    }

    section(&mut out, "Exposure");
    let _ = writeln!(out, "  Subdomain Count:     {}", s.subdomain_count);
    let _ = writeln!(out, "  Suspicious Disallow: {}", list(&s.suspicious_disallows));
    let _ = writeln!(
        out,
        "  Sitemap:             {}",
        s.sitemap.as_deref().unwrap_or("none")
    );

    section(&mut out, "Risks");
    if s.risks.is_empty() {
        let _ = writeln!(out, "{}", "  No risks identified.".green());
    } else {
        for risk in &s.risks {
            let _ = writeln!(
                out,
                "  [{}] [{}] {}",
                severity_label(risk.severity),
                risk.id.cyan(),
                risk.message
            );
        }
    }

    if !s.recommendations.is_empty() {
        section(&mut out, "Recommendations");
        for rec in &s.recommendations {
            let _ = writeln!(out, "  - {}", rec);
        }
    }

    out
}
