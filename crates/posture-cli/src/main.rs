mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::exit;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so JSON on stdout stays parseable.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let result = match &cli.command {
        Commands::Scan {
            target,
            url,
            format,
            fail_on_severity,
        } => commands::scan::scan(
            target.as_deref(),
            url.as_deref(),
            cli.config.as_ref(),
            *format,
            *fail_on_severity,
        ),
        Commands::Summarize {
            bag,
            format,
            fail_on_severity,
        } => commands::summarize::summarize_file(bag, *format, *fail_on_severity),
    };

    match result {
        Ok(true) => exit(1),
        Ok(false) => exit(0),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(2);
        }
    }
}
