//! `mdconf [FILES]...` sync command implementation.

use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use mdconf_config::{CliSettings, Config, EnvSettings};
use mdconf_confluence::{
    BatchSync, ConfluenceClient, PageRenderer, SyncAction, SyncOptions, SyncReport, expand_files,
};
use mdconf_diagrams::KrokiBackend;
use mdconf_markup::ConversionConfig;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the sync command.
#[derive(Args)]
pub(crate) struct SyncArgs {
    /// Markdown files or directories to sync (default: current directory).
    files: Vec<PathBuf>,

    /// Confluence domain, e.g. example.atlassian.net.
    #[arg(short, long)]
    domain: Option<String>,

    /// Confluence space key.
    #[arg(short, long)]
    space: Option<String>,

    /// Parent page ID for new pages.
    #[arg(short, long = "parent")]
    parent: Option<String>,

    /// Confluence account email.
    #[arg(short, long)]
    user: Option<String>,

    /// Confluence API token.
    #[arg(short, long)]
    token: Option<String>,

    /// Path to configuration file (default: auto-discover mdconf.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show what would change without touching Confluence.
    #[arg(long)]
    dry_run: bool,

    /// Emit Mermaid blocks as code instead of rendering them.
    #[arg(long)]
    no_mermaid: bool,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long)]
    kroki_url: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl SyncArgs {
    /// Execute the sync command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, a document cannot be
    /// read or rendered, or any document failed to sync.
    pub(crate) fn execute(&self, output: &Output) -> Result<(), CliError> {
        let config = Config::load(
            self.config.as_deref(),
            &EnvSettings::from_env(),
            &self.cli_settings(),
        )?;
        if let Some(path) = &config.config_path {
            debug!("Using config file {}", path.display());
        }

        let client = ConfluenceClient::from_config(&config.confluence);
        let backend = KrokiBackend::new(&config.diagrams.kroki_url, config.diagrams.timeout);
        let renderer = PageRenderer::new(
            &backend,
            ConversionConfig {
                diagrams_enabled: config.diagrams.mermaid,
                verbose: config.verbose,
            },
        );
        let options = SyncOptions {
            space_key: config.confluence.space.clone(),
            parent_page_id: config.confluence.parent_page_id.clone(),
            dry_run: config.dry_run,
        };

        let files = expand_files(&self.files);
        if files.is_empty() {
            output.warning("No Markdown files to sync");
            return Ok(());
        }

        let report = BatchSync::new(&client, &renderer, &options).run(&files)?;
        print_report(output, &report, options.dry_run);

        if report.is_success() {
            Ok(())
        } else {
            Err(CliError::Failed(report.failures.len()))
        }
    }

    /// Command-line layer of the configuration.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            domain: self.domain.clone(),
            space: self.space.clone(),
            parent_page_id: self.parent.clone(),
            email: self.user.clone(),
            api_token: self.token.clone(),
            kroki_url: self.kroki_url.clone(),
            mermaid: self.no_mermaid.then_some(false),
            dry_run: self.dry_run.then_some(true),
            verbose: self.verbose.then_some(true),
        }
    }
}

fn summary_line(report: &SyncReport) -> String {
    format!(
        "Sync complete: {} created, {} updated, {} skipped",
        report.count(SyncAction::Created),
        report.count(SyncAction::Updated),
        report.count(SyncAction::Skipped)
    )
}

fn print_report(output: &Output, report: &SyncReport, dry_run: bool) {
    if dry_run {
        output.warning("\n[DRY RUN] No changes made.");
    }
    output.success(&format!("\n{}", summary_line(report)));

    for outcome in report.changed() {
        output.info(&format!("  {}: {}", outcome.action, outcome.title));
        if !outcome.url.is_empty() {
            output.muted(&format!("    {}", outcome.url));
        }
    }

    if !report.failures.is_empty() {
        output.error(&format!("\nFailed ({}):", report.failures.len()));
        for failure in &report.failures {
            output.info(&format!("  {}", failure.file.display()));
            for line in failure.error.help_text().lines() {
                output.info(&format!("    {line}"));
            }
        }
    }
}
