//!
//! Command-line interface for bends: argument parsing, settings resolution
//! and wiring of the concrete collaborators into the core pipeline.
//!
//! All classification, ledger and rendering logic lives in `bends-core`.
//! This module only decides which clients to construct and fails fast on
//! configuration errors before any API is called.
use anyhow::{anyhow, bail, Context, Result};
use bends_core::clock::SystemClock;
use bends_core::config::NotifyConfig;
use bends_core::inventory::collect_services;
use bends_core::notify::notify;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::bitbucket::{BitbucketClient, BitbucketCredentials};
use crate::datadog::DatadogCatalog;
use crate::load_config::{load_config, load_inventory, Settings};
use crate::slack::SlackWebhook;

/// CLI for bends: report failed scheduled builds to each owning team.
#[derive(Parser)]
#[clap(
    name = "bends",
    version,
    about = "Build Error Notification Dispatch System: report failed scheduled builds per team"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every repository's latest scheduled build and notify teams
    Notify(NotifyArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct NotifyArgs {
    /// Path to a YAML settings file
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Teams to process. Processes every team by default
    #[clap(short = 't', long, num_args = 1..)]
    pub teams: Vec<String>,

    /// Repository slug patterns to ignore (regex search)
    #[clap(short = 'o', long = "override", num_args = 1..)]
    pub override_patterns: Vec<String>,

    /// JSON file with team → services data, used instead of the service catalog
    #[clap(short = 'D', long)]
    pub data: Option<PathBuf>,

    /// Log failed repositories instead of posting to Slack
    #[clap(short = 'd', long = "dry-run", alias = "dry_run")]
    pub dry_run: bool,

    /// Debug-level logging
    #[clap(short = 'v', long)]
    pub verbose: bool,

    /// Bitbucket workspace that owns the repositories
    #[clap(long, env = "BB_WORKSPACE")]
    pub workspace: Option<String>,

    /// Team receiving the overall summary
    #[clap(long, env = "BENDS_SUMMARY_RECIPIENT")]
    pub summary_recipient: Option<String>,
}

impl Cli {
    /// Debug logging from `--verbose` or `verbose: true` in the settings file.
    ///
    /// Runs before logging starts. An unreadable settings file counts as not
    /// verbose here; `run` reports the error.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Commands::Notify(args) => {
                args.verbose
                    || args
                        .config
                        .as_ref()
                        .and_then(|path| load_config(path).ok())
                        .is_some_and(|file| file.verbose)
            }
        }
    }
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Notify(args) => run_notify(args).await,
    }
}

async fn run_notify(args: NotifyArgs) -> Result<()> {
    let file = match &args.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    let settings = Settings::resolve(file, &args)?;
    tracing::debug!(command = "notify", ?settings, "Resolved settings");

    let config = NotifyConfig::new(
        settings.summary_recipient.clone().unwrap_or_default(),
        settings.teams.clone(),
        settings.override_patterns.as_slice(),
        settings.dry_run,
    )
    .map_err(|e| anyhow!("Invalid override pattern: {e}"))?;
    config.trace_loaded();

    // Delivery configuration is checked before any API is called.
    let sink = if settings.dry_run {
        None
    } else {
        if settings.summary_recipient.is_none() {
            bail!("A summary recipient is required unless running with --dry-run");
        }
        Some(SlackWebhook::from_env()?)
    };

    let inventory = match &settings.data {
        Some(path) => load_inventory(path)?,
        None => {
            let catalog = DatadogCatalog::from_env(settings.datadog_api_url.as_str())
                .context("Datadog credentials are required when --data is not given")?;
            collect_services(&catalog).await
        }
    };

    let host = BitbucketClient::new(
        settings.bitbucket_api_url.as_str(),
        settings.workspace.as_str(),
        BitbucketCredentials::from_env(),
    );

    tracing::info!(command = "notify", teams = inventory.len(), "Starting notification pass");
    let report = notify(&config, &inventory, &host, sink.as_ref(), SystemClock).await;

    let failed: usize = report.ledger.values().map(|l| l.failed.len()).sum();
    let succeeded: usize = report.ledger.values().map(|l| l.succeeded.len()).sum();
    match report.dispatch {
        Some(dispatch) => tracing::info!(
            command = "notify",
            succeeded,
            failed,
            delivered = dispatch.delivered,
            delivery_failures = dispatch.failed,
            "Notification pass complete"
        ),
        None => tracing::info!(command = "notify", succeeded, failed, "Dry run complete"),
    }
    Ok(())
}
