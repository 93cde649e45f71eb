//! Decides whether a repository's scheduled-build result is worth reporting.
//!
//! Both scans walk the history newest → oldest and stop at the first record
//! older than the recency window. Records past that point are never looked at.

use tracing::debug;

use crate::build::{BuildHistory, BuildRecord};
use crate::clock::RecencyClock;

pub struct BuildHistoryClassifier<C> {
    clock: C,
}

impl<C: RecencyClock> BuildHistoryClassifier<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Records inside the recency window, newest first, ending at the first
    /// stale record.
    fn recent<'a>(&self, history: &'a BuildHistory) -> impl Iterator<Item = &'a BuildRecord> {
        let now = self.clock.now();
        let window = self.clock.window();
        history
            .records()
            .iter()
            .take_while(move |record| now - record.created_at <= window)
    }

    /// True when the repository shows recent activity other than a single
    /// scheduled run: any non-scheduled trigger, or a second recent run of any
    /// kind (a second scheduled run included).
    pub fn is_in_development(&self, history: &BuildHistory) -> bool {
        let mut recent_seen = 0usize;
        for record in self.recent(history) {
            recent_seen += 1;
            if !record.trigger.is_scheduled() || recent_seen > 1 {
                debug!(trigger = ?record.trigger, recent_seen, "Repository is in development");
                return true;
            }
        }
        debug!(recent_seen, "Repository is not in development");
        false
    }

    /// Newest in-window scheduled run against `default_branch`.
    ///
    /// Only meaningful when [`is_in_development`](Self::is_in_development)
    /// returned false for the same history; the caller enforces that order.
    /// An unknown default branch matches nothing.
    pub fn find_recent_scheduled_build<'a>(
        &self,
        history: &'a BuildHistory,
        default_branch: Option<&str>,
    ) -> Option<&'a BuildRecord> {
        let branch = default_branch?;
        self.recent(history)
            .find(|record| record.trigger.is_scheduled() && record.target_branch == branch)
    }
}
