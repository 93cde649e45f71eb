//! Per-team success/failure ledger for one notification pass.
//!
//! Repositories are processed strictly one after another, teams in inventory
//! order. A repository that cannot be classified (ignored, no history, in
//! development, no recent scheduled build, fetch failure) leaves no trace in
//! the ledger.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::build::{BuildHistory, BuildResult, RepositoryService, TeamServices};
use crate::classify::BuildHistoryClassifier;
use crate::clock::RecencyClock;
use crate::contract::BuildHost;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamLedger {
    pub succeeded: Vec<RepositoryService>,
    pub failed: Vec<RepositoryService>,
}

impl TeamLedger {
    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }
}

/// Team name → ledger, iterated in team-name order.
pub type Ledger = BTreeMap<String, TeamLedger>;

/// Repository slug patterns to leave out of every ledger.
///
/// A pattern matches when it is found anywhere in the slug; anchor it with
/// `^` / `$` to restrict that.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList(Vec<Regex>);

impl IgnoreList {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(IgnoreList)
    }

    pub fn matches(&self, slug: &str) -> bool {
        self.0.iter().any(|pattern| pattern.is_match(slug))
    }
}

/// Why a repository did or did not end up in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    NoHistory,
    InDevelopment,
    NoRecentScheduledBuild,
    Succeeded,
    Failed,
}

pub struct TeamLedgerBuilder<'h, H: ?Sized, C> {
    host: &'h H,
    classifier: BuildHistoryClassifier<C>,
    selected_teams: Vec<String>,
    ignore: IgnoreList,
}

impl<'h, H, C> TeamLedgerBuilder<'h, H, C>
where
    H: BuildHost + ?Sized,
    C: RecencyClock,
{
    pub fn new(host: &'h H, clock: C) -> Self {
        Self {
            host,
            classifier: BuildHistoryClassifier::new(clock),
            selected_teams: Vec::new(),
            ignore: IgnoreList::default(),
        }
    }

    /// Restrict the pass to these teams. An empty list selects every team.
    pub fn with_selected_teams(mut self, teams: Vec<String>) -> Self {
        self.selected_teams = teams;
        self
    }

    pub fn with_ignore_list(mut self, ignore: IgnoreList) -> Self {
        self.ignore = ignore;
        self
    }

    fn is_selected(&self, team: &str) -> bool {
        self.selected_teams.is_empty() || self.selected_teams.iter().any(|t| t == team)
    }

    pub async fn build(&self, inventory: &TeamServices) -> Ledger {
        info!("Processing services");
        let mut ledger = Ledger::new();

        for (team, services) in inventory {
            if !self.is_selected(team) {
                info!(team = %team, "Team not selected, skipping");
                continue;
            }
            info!(team = %team, services = services.len(), "Processing services for team");

            let team_ledger = ledger.entry(team.clone()).or_default();
            for service in services {
                match self.classify_service(service).await {
                    Outcome::Succeeded => team_ledger.succeeded.push(service.clone()),
                    Outcome::Failed => team_ledger.failed.push(service.clone()),
                    _ => {}
                }
            }
        }

        info!(teams = ledger.len(), "Services processed");
        ledger
    }

    /// Classify a single repository, fetching whatever the decision needs.
    pub async fn classify_service(&self, service: &RepositoryService) -> Outcome {
        let slug = service.slug.as_str();
        debug!(repo = slug, "Processing service");

        if self.ignore.matches(slug) {
            info!(repo = slug, "Repository matches an override pattern, skipping");
            return Outcome::Ignored;
        }

        let records = match self.host.latest_builds(slug).await {
            Ok(Some(records)) if !records.is_empty() => records,
            Ok(_) => {
                info!(repo = slug, "No pipelines found, skipping");
                return Outcome::NoHistory;
            }
            Err(e) => {
                warn!(repo = slug, error = %e, "Failed to get latest pipelines, skipping");
                return Outcome::NoHistory;
            }
        };
        let history = BuildHistory::newest_first(records);

        if self.classifier.is_in_development(&history) {
            return Outcome::InDevelopment;
        }

        let default_branch = match self.host.default_branch(slug).await {
            Ok(branch) => branch,
            Err(e) => {
                warn!(repo = slug, error = %e, "Failed to get default branch name");
                None
            }
        };

        match self
            .classifier
            .find_recent_scheduled_build(&history, default_branch.as_deref())
        {
            None => {
                debug!(repo = slug, branch = ?default_branch, "No recent scheduled build");
                Outcome::NoRecentScheduledBuild
            }
            Some(build) if build.result == Some(BuildResult::Failed) => {
                info!(repo = slug, "Recent scheduled build failed");
                Outcome::Failed
            }
            Some(build) => {
                debug!(repo = slug, result = ?build.result, "Recent scheduled build succeeded");
                Outcome::Succeeded
            }
        }
    }
}
