//! Datadog service catalog client. Implements [`ServiceCatalog`].

use async_trait::async_trait;
use bends_core::contract::{CatalogEntry, CatalogPage, CollaboratorError, ServiceCatalog};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::env;

use crate::error::ApiError;

pub const DEFAULT_DATADOG_API_URL: &str = "https://api.datadoghq.com";

/// Schema version whose definitions carry `team` and `links`.
const SCHEMA_VERSION: &str = "v2.1";

pub struct DatadogCatalog {
    http: Client,
    base_url: String,
    api_key: String,
    application_key: String,
}

#[derive(Deserialize)]
struct DefinitionsPage {
    #[serde(default)]
    data: Vec<Definition>,
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct Definition {
    attributes: Attributes,
}

#[derive(Deserialize)]
struct Attributes {
    schema: Schema,
}

#[derive(Deserialize)]
struct Schema {
    #[serde(default)]
    team: Option<String>,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Deserialize)]
struct Link {
    url: String,
}

impl Definition {
    /// Team plus the URL of the definition's last link, which points at the
    /// repository.
    fn into_entry(self) -> Option<CatalogEntry> {
        let schema = self.attributes.schema;
        let team = schema.team?;
        let repository_url = schema.links.into_iter().last()?.url;
        Some(CatalogEntry {
            team,
            repository_url,
        })
    }
}

impl DatadogCatalog {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        application_key: impl Into<String>,
    ) -> Self {
        DatadogCatalog {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            application_key: application_key.into(),
        }
    }

    /// Construct from `DD_API_KEY` and `DD_APP_KEY`.
    pub fn from_env(base_url: impl Into<String>) -> Result<Self, env::VarError> {
        let api_key = env::var("DD_API_KEY").map_err(|e| {
            tracing::error!(error = ?e, "DD_API_KEY missing in environment");
            e
        })?;
        let application_key = env::var("DD_APP_KEY").map_err(|e| {
            tracing::error!(error = ?e, "DD_APP_KEY missing in environment");
            e
        })?;
        Ok(DatadogCatalog::new(base_url, api_key, application_key))
    }

    async fn fetch_page(&self, page: u32) -> Result<CatalogPage, ApiError> {
        let url = format!("{}/api/v2/services/definitions", self.base_url);
        let body = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .header("DD-API-KEY", &self.api_key)
            .header("DD-APPLICATION-KEY", &self.application_key)
            .query(&[
                ("schema_version", SCHEMA_VERSION.to_string()),
                ("page[number]", page.to_string()),
            ])
            .send()
            .await?
            .text()
            .await?;

        let parsed: DefinitionsPage = serde_json::from_str(&body)?;
        if let Some(errors) = parsed.errors {
            let first = errors
                .first()
                .map(Value::to_string)
                .unwrap_or_else(|| "unspecified error".to_string());
            return Err(ApiError::Api(first));
        }

        let total = parsed.data.len();
        let entries: Vec<CatalogEntry> = parsed
            .data
            .into_iter()
            .filter_map(Definition::into_entry)
            .collect();
        let skipped = total - entries.len();
        if skipped > 0 {
            tracing::debug!(page, skipped, "Definitions without team or links skipped");
        }
        Ok(CatalogPage { entries, skipped })
    }
}

#[async_trait]
impl ServiceCatalog for DatadogCatalog {
    async fn list_page(&self, page: u32) -> Result<CatalogPage, CollaboratorError> {
        tracing::debug!(page, "Fetching service definitions page");
        self.fetch_page(page).await.map_err(|e| {
            tracing::error!(page, error = %e, "Failed to list service definitions");
            Box::new(e) as CollaboratorError
        })
    }
}
