//! Data model shared by every stage: build records, repositories and the
//! team → repositories inventory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What caused a pipeline run to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Launched automatically by a time-based schedule.
    Schedule,
    Push,
    Manual,
    /// Any trigger name the build host reports that is not listed above.
    Other(String),
}

impl TriggerKind {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, TriggerKind::Schedule)
    }
}

impl From<&str> for TriggerKind {
    fn from(name: &str) -> Self {
        match name {
            "SCHEDULE" => TriggerKind::Schedule,
            "PUSH" => TriggerKind::Push,
            "MANUAL" => TriggerKind::Manual,
            other => TriggerKind::Other(other.to_string()),
        }
    }
}

/// Final outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildResult {
    Successful,
    Failed,
    Error,
    Stopped,
    Expired,
    Other(String),
}

impl From<&str> for BuildResult {
    fn from(name: &str) -> Self {
        match name {
            "SUCCESSFUL" => BuildResult::Successful,
            "FAILED" => BuildResult::Failed,
            "ERROR" => BuildResult::Error,
            "STOPPED" => BuildResult::Stopped,
            "EXPIRED" => BuildResult::Expired,
            other => BuildResult::Other(other.to_string()),
        }
    }
}

/// One execution of a CI pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub created_at: DateTime<Utc>,
    pub trigger: TriggerKind,
    /// Branch the run was configured against.
    pub target_branch: String,
    /// `None` while the run is still in progress.
    pub result: Option<BuildResult>,
}

/// A repository's build history, ordered newest-first by `created_at`.
///
/// Classification stops at the first record outside the recency window, so
/// ordering is established here rather than trusted from the build host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildHistory(Vec<BuildRecord>);

impl BuildHistory {
    pub fn newest_first(mut records: Vec<BuildRecord>) -> Self {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        BuildHistory(records)
    }

    pub fn records(&self) -> &[BuildRecord] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// One catalog entry: a repository owned by a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryService {
    #[serde(rename = "RepositorySlug")]
    pub slug: String,
    #[serde(rename = "RepositoryUrl")]
    pub url: String,
    /// Owning team. Filled from the inventory key, not from the document body.
    #[serde(skip)]
    pub team: String,
}

/// Team name → repositories owned by that team, iterated in team-name order.
pub type TeamServices = BTreeMap<String, Vec<RepositoryService>>;
