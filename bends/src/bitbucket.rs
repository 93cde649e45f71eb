//! Bitbucket Cloud client: build history and default branch per repository.
//!
//! Implements [`BuildHost`]. Untyped API responses are decoded here into
//! [`BuildRecord`]s; anything error-shaped or undecodable becomes an
//! [`ApiError`] and the ledger builder skips the repository.

use async_trait::async_trait;
use bends_core::build::{BuildRecord, BuildResult, TriggerKind};
use bends_core::contract::{BuildHost, CollaboratorError};
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::env;

use crate::error::ApiError;

pub const DEFAULT_BITBUCKET_API_URL: &str = "https://api.bitbucket.org/2.0";

/// App-password credentials for the Bitbucket API.
#[derive(Clone)]
pub struct BitbucketCredentials {
    pub user_id: String,
    pub app_password: String,
}

impl BitbucketCredentials {
    /// Read `BB_USER_ID` / `BB_APP_PASS`. `None` when either is unset.
    pub fn from_env() -> Option<Self> {
        match (env::var("BB_USER_ID"), env::var("BB_APP_PASS")) {
            (Ok(user_id), Ok(app_password)) => Some(BitbucketCredentials {
                user_id,
                app_password,
            }),
            _ => {
                tracing::warn!("BB_USER_ID or BB_APP_PASS not set, calling Bitbucket anonymously");
                None
            }
        }
    }
}

pub struct BitbucketClient {
    http: Client,
    base_url: String,
    workspace: String,
    credentials: Option<BitbucketCredentials>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Paged listing envelope shared by every Bitbucket collection endpoint.
#[derive(Deserialize)]
struct Paged<T> {
    values: Option<Vec<T>>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct Pipeline {
    created_on: DateTime<Utc>,
    trigger: Named,
    #[serde(default)]
    target: Option<Target>,
    #[serde(default)]
    state: Option<State>,
}

#[derive(Deserialize)]
struct Named {
    name: String,
}

#[derive(Deserialize)]
struct Target {
    #[serde(default)]
    selector: Option<Selector>,
}

#[derive(Deserialize)]
struct Selector {
    #[serde(default)]
    pattern: Option<String>,
}

#[derive(Deserialize)]
struct State {
    #[serde(default)]
    result: Option<Named>,
}

impl From<Pipeline> for BuildRecord {
    fn from(p: Pipeline) -> Self {
        BuildRecord {
            created_at: p.created_on,
            trigger: TriggerKind::from(p.trigger.name.as_str()),
            target_branch: p
                .target
                .and_then(|t| t.selector)
                .and_then(|s| s.pattern)
                .unwrap_or_default(),
            result: p
                .state
                .and_then(|s| s.result)
                .map(|r| BuildResult::from(r.name.as_str())),
        }
    }
}

#[derive(Deserialize)]
struct Branch {
    name: String,
}

impl BitbucketClient {
    pub fn new(
        base_url: impl Into<String>,
        workspace: impl Into<String>,
        credentials: Option<BitbucketCredentials>,
    ) -> Self {
        BitbucketClient {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            workspace: workspace.into(),
            credentials,
        }
    }

    fn repository_url(&self, slug: &str, path: &str) -> String {
        format!(
            "{}/repositories/{}/{}/{}",
            self.base_url, self.workspace, slug, path
        )
    }

    /// GET a paged collection and return its `values`.
    async fn get_values<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<Vec<T>>, ApiError> {
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .query(query);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.user_id, Some(&creds.app_password));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let page: Paged<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(%status, url, error = %e, "Undecodable Bitbucket response");
            e
        })?;
        if let Some(err) = page.error {
            return Err(ApiError::Api(err.message));
        }
        if !status.is_success() {
            return Err(ApiError::Api(format!("unexpected status {status}")));
        }
        Ok(page.values)
    }
}

#[async_trait]
impl BuildHost for BitbucketClient {
    async fn latest_builds(
        &self,
        repository_slug: &str,
    ) -> Result<Option<Vec<BuildRecord>>, CollaboratorError> {
        tracing::debug!(repo = repository_slug, "Retrieving latest pipelines");
        let url = self.repository_url(repository_slug, "pipelines");
        match self
            .get_values::<Pipeline>(&url, &[("sort", "-created_on")])
            .await
        {
            Ok(pipelines) => Ok(pipelines.map(|p| p.into_iter().map(BuildRecord::from).collect())),
            Err(e) => {
                tracing::error!(repo = repository_slug, error = %e, "Failed to get latest pipelines");
                Err(Box::new(e))
            }
        }
    }

    async fn default_branch(
        &self,
        repository_slug: &str,
    ) -> Result<Option<String>, CollaboratorError> {
        let url = self.repository_url(repository_slug, "refs/branches");
        match self
            .get_values::<Branch>(&url, &[("q", r#"name="main" OR name="master""#)])
            .await
        {
            Ok(branches) => Ok(branches
                .and_then(|b| b.into_iter().next())
                .map(|b| b.name)),
            Err(e) => {
                tracing::error!(repo = repository_slug, error = %e, "Failed to get default branch name");
                Err(Box::new(e))
            }
        }
    }
}
