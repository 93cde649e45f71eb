use tracing::{debug, info};

use crate::ledger::IgnoreList;

/// Settings for one notification pass.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Team (channel suffix) that receives the cross-team digest.
    pub summary_recipient: String,
    /// Teams to process. Empty means every team in the inventory.
    pub teams: Vec<String>,
    /// Repositories whose slug matches any of these are left out.
    pub ignore: IgnoreList,
    /// Log failed repositories instead of delivering digests.
    pub dry_run: bool,
}

impl NotifyConfig {
    pub fn new<S: AsRef<str>>(
        summary_recipient: impl Into<String>,
        teams: Vec<String>,
        ignore_patterns: &[S],
        dry_run: bool,
    ) -> Result<Self, regex::Error> {
        Ok(NotifyConfig {
            summary_recipient: summary_recipient.into(),
            teams,
            ignore: IgnoreList::new(ignore_patterns)?,
            dry_run,
        })
    }

    pub fn trace_loaded(&self) {
        info!(
            summary_recipient = %self.summary_recipient,
            teams = self.teams.len(),
            dry_run = self.dry_run,
            "Loaded NotifyConfig"
        );
        debug!(?self, "NotifyConfig loaded (full debug)");
    }
}
