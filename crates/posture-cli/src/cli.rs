use clap::{Parser, Subcommand, ValueEnum};
use posture_core::Severity;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "posture")]
#[command(about = "Aggregate public security signals for a domain", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ./posture.toml)
    #[arg(long, short, global = true, env = "POSTURE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every source against a domain and print its summary
    Scan {
        /// Domain to scan, e.g. example.com
        target: Option<String>,
        /// Explicit base URL; its host overrides the target domain
        #[arg(long)]
        url: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Exit 1 if any risk is at or above this severity
        #[arg(long, value_parser = parse_severity)]
        fail_on_severity: Option<Severity>,
    },
    /// Summarize a saved scan bag (JSON) without network access
    Summarize {
        /// A raw bag, a POST /scan response or `scan --format json` output
        bag: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Exit 1 if any risk is at or above this severity
        #[arg(long, value_parser = parse_severity)]
        fail_on_severity: Option<Severity>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    match s.to_ascii_lowercase().as_str() {
        "info" | "low" | "medium" | "high" | "critical" => Ok(Severity::from(s)),
        _ => Err(format!(
            "unknown severity '{}' (expected info, low, medium, high or critical)",
            s
        )),
    }
}
