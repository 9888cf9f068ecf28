//! Fixed-layout PDF export of a stored scan.
//!
//! Layout is computed as a list of [`Line`]s first, then drawn onto A4
//! pages with the built-in Helvetica faces. Built-in fonts only cover
//! Latin-1, so text is transliterated before drawing.

use crate::store::ScanRecord;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use thiserror::Error;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LAYER: &str = "Layer 1";

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;

const PT_TO_MM: f32 = 0.3528;
/// Helvetica's mean advance width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;
const LINE_SPACING: f32 = 1.4;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdf generation failed: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Title(String),
    Heading(String),
    Text(String),
    Gap,
}

impl Line {
    fn size(&self) -> f32 {
        match self {
            Line::Title(_) => TITLE_SIZE,
            Line::Heading(_) => HEADING_SIZE,
            Line::Text(_) | Line::Gap => BODY_SIZE,
        }
    }
}

fn text(s: impl Into<String>) -> Line {
    Line::Text(s.into())
}

fn joined(items: &[String]) -> String {
    items.join(", ")
}

/// The report content in reading order.
pub fn report_lines(record: &ScanRecord) -> Vec<Line> {
    let r = &record.result;
    let mut lines = vec![
        Line::Title("Scan Report".into()),
        Line::Gap,
        text(format!("Domain: {}", record.target)),
        text(format!("URL: {}", record.url)),
        text(format!(
            "Timestamp: {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )),
        Line::Gap,
        Line::Heading("TLS Summary".into()),
        text(format!("SSL Grade: {}", r.ssl_grade)),
        text(format!("IP Address: {}", r.ip_address)),
        text(format!("Server Signature: {}", r.server_signature)),
        text(format!(
            "Modern TLS: {}",
            if r.modern_tls { "Yes" } else { "No" }
        )),
        text(format!(
            "Strongest Cipher: {}",
            r.strongest_cipher.as_deref().unwrap_or("n/a")
        )),
        Line::Gap,
        Line::Heading("Security Headers".into()),
        text(format!("Present: {}", joined(&r.present_headers))),
        text(format!("Missing: {}", joined(&r.missing_headers))),
        Line::Gap,
        Line::Heading("Technologies".into()),
        text(format!("Detected JS libs: {}", joined(&r.libs))),
        text(format!("Top Tech: {}", joined(&r.techs))),
        Line::Gap,
        Line::Heading("Exposure".into()),
        text(format!("Subdomain Count: {}", r.subdomain_count)),
        text(format!(
            "Suspicious Disallow: {}",
            joined(&r.suspicious_disallows)
        )),
        text(format!(
            "Sitemap: {}",
            r.sitemap.as_deref().unwrap_or("none")
        )),
        Line::Gap,
        Line::Heading("Risks".into()),
    ];

    if r.risks.is_empty() {
        lines.push(text("No risks identified"));
    } else {
        lines.extend(
            r.risks
                .iter()
                .map(|f| text(format!("{}: {}", f.severity, f.message))),
        );
    }
    lines
}

pub fn render_report(record: &ScanRecord) -> Result<Vec<u8>, RenderError> {
    let title = format!("Scan Report {}", sanitize(&record.target));
    let (doc, page, layer) = PdfDocument::new(title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    let mut cursor = Cursor {
        layer: doc.get_page(page).get_layer(layer),
        doc: &doc,
        y: PAGE_HEIGHT - MARGIN,
    };

    for line in report_lines(record) {
        let size = line.size();
        let height = size * PT_TO_MM * LINE_SPACING;
        match &line {
            Line::Gap => cursor.advance(height * 0.5),
            Line::Title(s) | Line::Heading(s) => {
                for row in wrap(&sanitize(s), max_chars(size)) {
                    cursor.draw(&row, size, height, &bold);
                }
            }
            Line::Text(s) => {
                for row in wrap(&sanitize(s), max_chars(size)) {
                    cursor.draw(&row, size, height, &regular);
                }
            }
        }
    }

    doc.save_to_bytes()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl Cursor<'_> {
    fn draw(&mut self, row: &str, size: f32, height: f32, font: &IndirectFontRef) {
        if self.y - height < MARGIN {
            self.new_page();
        }
        self.y -= height;
        self.layer
            .use_text(row, size, Mm(MARGIN), Mm(self.y), font);
    }

    fn advance(&mut self, by: f32) {
        self.y -= by;
        if self.y < MARGIN {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }
}

fn max_chars(size: f32) -> usize {
    let glyph = size * PT_TO_MM * AVG_GLYPH_WIDTH;
    (((PAGE_WIDTH - 2.0 * MARGIN) / glyph) as usize).max(1)
}

/// Greedy word wrap. Words longer than a line are split.
pub fn wrap(s: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();

    for word in s.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                rows.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            rows.push(word.into_iter().collect());
            word = rest;
        }

        let len = current.chars().count();
        if len > 0 && len + 1 + word.len() > width {
            rows.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}

/// Maps text onto the Latin-1 range the built-in fonts can draw.
pub fn sanitize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\t' | '\n' | '\r' => out.push(' '),
            c if c.is_control() => {}
            c if (c as u32) <= 0xFF => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use posture_core::{Finding, ScanSummary, Severity};

    fn record(summary: ScanSummary) -> ScanRecord {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        ScanRecord {
            id: "abc".into(),
            target: "example.com".into(),
            url: "https://example.com/".into(),
            timestamp: at,
            result: summary,
            created_at: at,
            updated_at: at,
        }
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines
            .iter()
            .filter_map(|l| match l {
                Line::Text(s) | Line::Heading(s) | Line::Title(s) => Some(s.as_str()),
                Line::Gap => None,
            })
            .collect()
    }

    #[test]
    fn sections_appear_in_order() {
        let lines = report_lines(&record(ScanSummary::default()));
        let headings: Vec<&str> = lines
            .iter()
            .filter_map(|l| match l {
                Line::Heading(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            headings,
            vec!["TLS Summary", "Security Headers", "Technologies", "Exposure", "Risks"]
        );
    }

    #[test]
    fn empty_summary_uses_placeholders() {
        let lines = report_lines(&record(ScanSummary::default()));
        let t = texts(&lines);
        assert!(t.contains(&"Timestamp: 2025-06-01 12:00:00 UTC"));
        assert!(t.contains(&"Modern TLS: No"));
        assert!(t.contains(&"Strongest Cipher: n/a"));
        assert!(t.contains(&"Sitemap: none"));
        assert_eq!(t.last(), Some(&"No risks identified"));
    }

    #[test]
    fn risks_listed_with_uppercase_severity() {
        let summary = ScanSummary {
            risks: vec![
                Finding::new("missing_hsts", Severity::High, "HSTS header missing"),
                Finding::new("missing_csp", Severity::Medium, "CSP header missing"),
            ],
            ..Default::default()
        };
        let lines = report_lines(&record(summary));
        let t = texts(&lines);
        assert!(t.contains(&"HIGH: HSTS header missing"));
        assert!(t.contains(&"MEDIUM: CSP header missing"));
        assert!(!t.contains(&"No risks identified"));
    }

    #[test]
    fn renders_a_pdf_document() {
        let summary = ScanSummary {
            ssl_grade: "A".into(),
            headline: "A • nginx • 3 subdomains…".into(),
            present_headers: vec!["x-frame-options".into()],
            ..Default::default()
        };
        let bytes = render_report(&record(summary)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_reports_break_onto_new_pages() {
        let summary = ScanSummary {
            risks: (0..200)
                .map(|i| Finding::new("r", Severity::Low, format!("finding number {}", i)))
                .collect(),
            ..Default::default()
        };
        let short = render_report(&record(ScanSummary::default())).unwrap();
        let long = render_report(&record(summary)).unwrap();
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }

    #[test]
    fn wrap_respects_width_and_splits_long_words() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn sanitize_transliterates_non_latin1() {
        assert_eq!(sanitize("A • B…"), "A - B...");
        assert_eq!(sanitize("café"), "café");
        assert_eq!(sanitize("日本"), "??");
        assert_eq!(sanitize("a\u{0007}b"), "ab");
    }
}
