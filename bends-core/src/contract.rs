//! # contract: the seams between the core pipeline and the outside world
//!
//! The core never talks to a network. Every external system it depends on is
//! one of the traits below, implemented by HTTP clients in the `bends` crate
//! and by `mockall` mocks in tests.
//!
//! - [`ServiceCatalog`]: paged listing of services and their owning teams.
//! - [`BuildHost`]: per-repository build history and default branch.
//! - [`DigestSink`]: delivery of one bounded chunk of presentation blocks.
//!
//! All methods return [`CollaboratorError`] on failure. How a failure is
//! handled (skip, stop paging, swallow) is decided by the caller, never by
//! the implementor, and nothing is retried.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::build::BuildRecord;
use crate::digest::PresentationBlock;

/// Error type for every collaborator (simple boxed error).
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// One catalog definition: the owning team and the repository link it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub team: String,
    pub repository_url: String,
}

/// One page of catalog results. An empty page marks the end of the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    /// Definitions on this page that carried no team or no link.
    pub skipped: usize,
}

impl CatalogPage {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.skipped == 0
    }
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    /// Fetch page `page` (zero-based) of service definitions.
    async fn list_page(&self, page: u32) -> Result<CatalogPage, CollaboratorError>;
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait BuildHost: Send + Sync {
    /// The latest page of builds for a repository.
    ///
    /// `Ok(None)` when the host returned no build list at all. Order is not
    /// trusted; callers wrap the result in [`crate::build::BuildHistory`].
    async fn latest_builds(
        &self,
        repository_slug: &str,
    ) -> Result<Option<Vec<BuildRecord>>, CollaboratorError>;

    /// Name of the repository's `main` or `master` branch, if either exists.
    async fn default_branch(
        &self,
        repository_slug: &str,
    ) -> Result<Option<String>, CollaboratorError>;
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DigestSink: Send + Sync {
    /// Deliver one chunk of blocks addressed to `team`.
    async fn deliver(
        &self,
        team: &str,
        blocks: Vec<PresentationBlock>,
    ) -> Result<(), CollaboratorError>;
}
