/// `load_config` module: loads the optional YAML settings file and merges it
/// with command-line flags into the [`Settings`] for one run.
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into typed structs
/// - Merge file values with CLI flags (flags win)
/// - Load the static inventory document used by `--data`
///
/// Secrets (API keys, webhook URL, app passwords) are never read from the
/// file; the clients read them from the environment.
///
/// # Errors
/// All errors use `anyhow::Error` with the offending path in context and are
/// surfaced at the CLI boundary as fatal configuration errors.
use anyhow::{anyhow, Context, Result};
use bends_core::build::TeamServices;
use bends_core::inventory::services_from_document;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::bitbucket::DEFAULT_BITBUCKET_API_URL;
use crate::cli::NotifyArgs;
use crate::datadog::DEFAULT_DATADOG_API_URL;

/// Settings file schema. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub workspace: Option<String>,
    pub summary_recipient: Option<String>,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default, rename = "override")]
    pub override_patterns: Vec<String>,
    pub data: Option<PathBuf>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub verbose: bool,
    pub bitbucket_api_url: Option<String>,
    pub datadog_api_url: Option<String>,
}

/// Fully resolved settings for one `notify` run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub workspace: String,
    pub summary_recipient: Option<String>,
    pub teams: Vec<String>,
    pub override_patterns: Vec<String>,
    pub data: Option<PathBuf>,
    pub dry_run: bool,
    pub verbose: bool,
    pub bitbucket_api_url: String,
    pub datadog_api_url: String,
}

impl Settings {
    /// Merge the settings file (if any) with CLI flags. Non-empty flag lists
    /// replace file lists; `dry_run` and `verbose` are on if either source
    /// turns them on.
    pub fn resolve(file: Option<FileConfig>, args: &NotifyArgs) -> Result<Settings> {
        let file = file.unwrap_or_default();
        let workspace = args
            .workspace
            .clone()
            .or(file.workspace)
            .filter(|w| !w.trim().is_empty())
            .ok_or_else(|| {
                error!("No Bitbucket workspace configured");
                anyhow!("Bitbucket workspace is required (--workspace, BB_WORKSPACE or `workspace` in the config file)")
            })?;

        Ok(Settings {
            workspace,
            summary_recipient: args.summary_recipient.clone().or(file.summary_recipient),
            teams: prefer_flags(&args.teams, file.teams),
            override_patterns: prefer_flags(&args.override_patterns, file.override_patterns),
            data: args.data.clone().or(file.data),
            dry_run: args.dry_run || file.dry_run,
            verbose: args.verbose || file.verbose,
            bitbucket_api_url: file
                .bitbucket_api_url
                .unwrap_or_else(|| DEFAULT_BITBUCKET_API_URL.to_string()),
            datadog_api_url: file
                .datadog_api_url
                .unwrap_or_else(|| DEFAULT_DATADOG_API_URL.to_string()),
        })
    }
}

fn prefer_flags(flags: &[String], file: Vec<String>) -> Vec<String> {
    if flags.is_empty() {
        file
    } else {
        flags.to_vec()
    }
}

/// Loads a static YAML settings file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        anyhow!("Failed to read config file {:?}: {}", path_ref, e)
    })?;

    let config: FileConfig = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        anyhow!("Failed to parse config YAML: {e}")
    })?;
    info!(config_path = ?path_ref, "Parsed config YAML successfully");
    Ok(config)
}

/// Loads the `--data` inventory document (team → services JSON).
pub fn load_inventory<P: AsRef<Path>>(path: P) -> Result<TeamServices> {
    let path_ref = path.as_ref();
    info!(data_path = ?path_ref, "Loading service data from file");
    let content = fs::read_to_string(path_ref)
        .with_context(|| format!("Failed to read service data file {:?}", path_ref))?;
    services_from_document(&content)
        .with_context(|| format!("Failed to parse service data file {:?}", path_ref))
}
