//! mdconf CLI - sync Markdown documents to Confluence.
//!
//! Converts each Markdown file to Confluence storage format, renders Mermaid
//! diagrams into attachments and creates, updates or skips the matching page.

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::SyncArgs;
use output::Output;

/// mdconf - Markdown to Confluence sync.
#[derive(Parser)]
#[command(name = "mdconf", version, about)]
struct Cli {
    #[command(flatten)]
    sync: SyncArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.sync.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.sync.execute(&output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}
