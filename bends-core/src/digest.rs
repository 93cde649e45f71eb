//! Renders ledgers into presentation blocks.
//!
//! Two separate views are produced: the overall digest covers every processed
//! team, the per-team digests exist only for teams with at least one failure.
//! Blocks serialise to Slack Block Kit JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::build::RepositoryService;
use crate::ledger::{Ledger, TeamLedger};

pub const DIGEST_TITLE: &str = "Build Error Notification Dispatch System";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText { text: String },
    Mrkdwn { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PresentationBlock {
    Header { text: TextObject },
    Divider,
    Section { text: TextObject },
}

impl PresentationBlock {
    pub fn header(text: impl Into<String>) -> Self {
        PresentationBlock::Header {
            text: TextObject::PlainText { text: text.into() },
        }
    }

    pub fn divider() -> Self {
        PresentationBlock::Divider
    }

    pub fn section(markdown: impl Into<String>) -> Self {
        PresentationBlock::Section {
            text: TextObject::Mrkdwn {
                text: markdown.into(),
            },
        }
    }

    /// Text carried by the block; `None` for dividers.
    pub fn text(&self) -> Option<&str> {
        match self {
            PresentationBlock::Header { text } | PresentationBlock::Section { text } => match text {
                TextObject::PlainText { text } | TextObject::Mrkdwn { text } => Some(text.as_str()),
            },
            PresentationBlock::Divider => None,
        }
    }
}

/// Success count line. Singular only for exactly one repository.
pub fn success_summary(count: usize) -> String {
    if count == 1 {
        format!("*Successful Builds*\n>*{count} repository* had a successful build.")
    } else {
        format!("*Successful Builds*\n>*{count} repositories* had successful builds.")
    }
}

/// One link line per failed repository, or a "no failures" line.
pub fn failure_summary(failed: &[RepositoryService]) -> String {
    let mut text = String::from("*Failed Builds*\n");
    if failed.is_empty() {
        text.push_str(">No failed builds.");
    }
    for repo in failed {
        text.push_str(&format!(">• <{}|{}>\n", repo.url, repo.slug));
    }
    text
}

/// Complete view: every team in the ledger, in ledger order.
pub fn render_overall(ledger: &Ledger) -> Vec<PresentationBlock> {
    info!("Generating overall summary");
    let mut blocks = vec![PresentationBlock::header(DIGEST_TITLE)];

    for (team, entry) in ledger {
        blocks.push(PresentationBlock::divider());
        blocks.push(PresentationBlock::section(format!("Team: *{team}*")));

        if entry.is_empty() {
            blocks.push(PresentationBlock::section(
                "No scheduled builds in repositories not in development.",
            ));
            continue;
        }

        blocks.push(PresentationBlock::section(success_summary(entry.succeeded.len())));
        blocks.push(PresentationBlock::section(failure_summary(&entry.failed)));
    }
    blocks
}

/// Subset view: a standalone digest for each team that had a failure.
pub fn render_per_team(ledger: &Ledger) -> BTreeMap<String, Vec<PresentationBlock>> {
    info!("Generating team summaries");
    ledger
        .iter()
        .filter(|(_, entry)| !entry.failed.is_empty())
        .map(|(team, entry)| (team.clone(), render_team(entry)))
        .collect()
}

fn render_team(entry: &TeamLedger) -> Vec<PresentationBlock> {
    vec![
        PresentationBlock::header(DIGEST_TITLE),
        PresentationBlock::divider(),
        PresentationBlock::section(success_summary(entry.succeeded.len())),
        PresentationBlock::divider(),
        PresentationBlock::section(failure_summary(&entry.failed)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repo(slug: &str) -> RepositoryService {
        RepositoryService {
            slug: slug.into(),
            url: format!("https://bitbucket.org/acme/{slug}"),
            team: "core".into(),
        }
    }

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.insert(
            "core".into(),
            TeamLedger {
                succeeded: vec![repo("ledger")],
                failed: vec![repo("billing"), repo("invoices")],
            },
        );
        ledger.insert("idle".into(), TeamLedger::default());
        ledger.insert(
            "web".into(),
            TeamLedger {
                succeeded: vec![repo("storefront"), repo("checkout")],
                failed: vec![],
            },
        );
        ledger
    }

    #[test]
    fn pluralises_only_at_one() {
        assert_eq!(
            success_summary(1),
            "*Successful Builds*\n>*1 repository* had a successful build."
        );
        assert_eq!(
            success_summary(2),
            "*Successful Builds*\n>*2 repositories* had successful builds."
        );
        assert_eq!(
            success_summary(0),
            "*Successful Builds*\n>*0 repositories* had successful builds."
        );
    }

    #[test]
    fn overall_digest_covers_every_team() {
        let blocks = render_overall(&ledger());
        let texts: Vec<Option<&str>> = blocks.iter().map(PresentationBlock::text).collect();
        assert_eq!(
            texts,
            vec![
                Some(DIGEST_TITLE),
                None,
                Some("Team: *core*"),
                Some("*Successful Builds*\n>*1 repository* had a successful build."),
                Some(
                    "*Failed Builds*\n>• <https://bitbucket.org/acme/billing|billing>\n>• <https://bitbucket.org/acme/invoices|invoices>\n"
                ),
                None,
                Some("Team: *idle*"),
                Some("No scheduled builds in repositories not in development."),
                None,
                Some("Team: *web*"),
                Some("*Successful Builds*\n>*2 repositories* had successful builds."),
                Some("*Failed Builds*\n>No failed builds."),
            ]
        );
    }

    #[test]
    fn per_team_digest_only_for_teams_with_failures() {
        let digests = render_per_team(&ledger());
        assert_eq!(digests.keys().collect::<Vec<_>>(), vec!["core"]);
        let core = &digests["core"];
        assert_eq!(core.len(), 5);
        assert_eq!(core[1], PresentationBlock::Divider);
        assert_eq!(core[3], PresentationBlock::Divider);
    }

    #[test]
    fn team_with_only_failures_reports_zero_successes() {
        let mut ledger = Ledger::new();
        ledger.insert(
            "ops".into(),
            TeamLedger {
                succeeded: vec![],
                failed: vec![repo("deployer")],
            },
        );
        let digests = render_per_team(&ledger);
        assert_eq!(
            digests["ops"][2].text(),
            Some("*Successful Builds*\n>*0 repositories* had successful builds.")
        );
    }

    #[test]
    fn blocks_serialise_as_block_kit() {
        let blocks = vec![
            PresentationBlock::header("Title"),
            PresentationBlock::divider(),
            PresentationBlock::section("*bold*"),
        ];
        assert_eq!(
            serde_json::to_value(&blocks).unwrap(),
            json!([
                {"type": "header", "text": {"type": "plain_text", "text": "Title"}},
                {"type": "divider"},
                {"type": "section", "text": {"type": "mrkdwn", "text": "*bold*"}}
            ])
        );
    }
}
