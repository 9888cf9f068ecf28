mod json;
mod text;

use crate::cli::Format;
use anyhow::Result;
use posture_core::ScanSummary;

pub use json::render_json;
pub use text::render_text;

pub fn print_summary(summary: &ScanSummary, format: Format) -> Result<()> {
    match format {
        Format::Text => print!("{}", render_text(summary)),
        Format::Json => println!("{}", render_json(summary)?),
    }
    Ok(())
}
