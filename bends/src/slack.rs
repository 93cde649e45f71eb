//! Slack incoming-webhook delivery. Implements [`DigestSink`].

use async_trait::async_trait;
use bends_core::contract::{CollaboratorError, DigestSink};
use bends_core::digest::PresentationBlock;
use reqwest::Client;
use serde::Serialize;
use std::env;

use crate::error::ApiError;

pub struct SlackWebhook {
    http: Client,
    webhook_url: String,
}

#[derive(Serialize)]
struct Payload<'a> {
    blocks: &'a [PresentationBlock],
    channel: String,
}

/// Channel a team's digest is posted to.
pub fn team_channel(team: &str) -> String {
    format!("team-{team}-bots")
}

impl SlackWebhook {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        SlackWebhook {
            http: Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    /// Construct from `SLACK_WEBHOOK_URL`. A missing or empty value is a
    /// configuration error.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        match env::var("SLACK_WEBHOOK_URL") {
            Ok(url) if !url.trim().is_empty() => Ok(SlackWebhook::new(url)),
            _ => {
                tracing::error!("SLACK_WEBHOOK_URL environment variable is required for Slack notifications");
                Err(anyhow::anyhow!(
                    "SLACK_WEBHOOK_URL environment variable is required for Slack notifications"
                ))
            }
        }
    }

    async fn post(&self, team: &str, blocks: &[PresentationBlock]) -> Result<(), ApiError> {
        let payload = Payload {
            blocks,
            channel: team_channel(team),
        };
        self.http
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl DigestSink for SlackWebhook {
    async fn deliver(
        &self,
        team: &str,
        blocks: Vec<PresentationBlock>,
    ) -> Result<(), CollaboratorError> {
        tracing::debug!(team, blocks = blocks.len(), "Posting digest chunk to Slack");
        self.post(team, &blocks).await.map_err(|e| {
            tracing::error!(team, error = %e, "Error posting to Slack");
            Box::new(e) as CollaboratorError
        })
    }
}
