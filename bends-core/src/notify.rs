//! One full notification pass: inventory → ledger → digests → delivery.
//!
//! # Flow
//! 1. Build the per-team ledger with [`TeamLedgerBuilder`], one repository at
//!    a time.
//! 2. Dry run, or no sink given: log each team's failed repositories and
//!    stop. A missing sink outside dry run is logged as a warning.
//! 3. Otherwise render the per-team digests plus the overall digest and hand
//!    them to a [`DigestDispatcher`]. The overall digest goes to the
//!    configured summary recipient, after every team digest.
//!
//! # Error Handling
//! Nothing here fails. Fetch and delivery errors are logged where they
//! happen and only shrink the ledger or the delivery count.

use tracing::{info, warn};

use crate::build::TeamServices;
use crate::clock::RecencyClock;
use crate::config::NotifyConfig;
use crate::contract::{BuildHost, DigestSink};
use crate::digest::{render_overall, render_per_team, PresentationBlock};
use crate::dispatch::{DigestDispatcher, DispatchReport};
use crate::ledger::{Ledger, TeamLedgerBuilder};

#[derive(Debug)]
pub struct NotifyReport {
    pub ledger: Ledger,
    /// `None` when nothing was delivered (dry run).
    pub dispatch: Option<DispatchReport>,
}

pub async fn notify<H, S, C>(
    config: &NotifyConfig,
    inventory: &TeamServices,
    host: &H,
    sink: Option<&S>,
    clock: C,
) -> NotifyReport
where
    H: BuildHost + ?Sized,
    S: DigestSink + ?Sized,
    C: RecencyClock,
{
    let ledger = TeamLedgerBuilder::new(host, clock)
        .with_selected_teams(config.teams.clone())
        .with_ignore_list(config.ignore.clone())
        .build(inventory)
        .await;

    let dispatch = match (config.dry_run, sink) {
        (false, Some(sink)) => {
            let digests = digests_for_delivery(&ledger, &config.summary_recipient);
            Some(DigestDispatcher::new(sink).dispatch_all(&digests).await)
        }
        (dry_run, _) => {
            if !dry_run {
                warn!("No digest sink given; listing failed builds instead of delivering");
            }
            for line in dry_run_lines(&ledger) {
                info!("{line}");
            }
            None
        }
    };

    NotifyReport { ledger, dispatch }
}

/// Team digests in ledger order, then the overall digest for `recipient`.
///
/// When the recipient is itself a team with failures, the overall digest
/// takes the place of that team's own digest.
pub fn digests_for_delivery(
    ledger: &Ledger,
    recipient: &str,
) -> Vec<(String, Vec<PresentationBlock>)> {
    let mut digests: Vec<_> = render_per_team(ledger).into_iter().collect();
    let overall = render_overall(ledger);
    match digests.iter().position(|(team, _)| team == recipient) {
        Some(index) => digests[index].1 = overall,
        None => digests.push((recipient.to_string(), overall)),
    }
    digests
}

/// Dry-run listing: a heading per team followed by its failed slugs.
pub fn dry_run_lines(ledger: &Ledger) -> Vec<String> {
    let mut lines = Vec::new();
    for (team, entry) in ledger {
        lines.push(format!("***Failed Builds for Team: {team}***"));
        lines.extend(entry.failed.iter().map(|repo| repo.slug.clone()));
    }
    lines
}
