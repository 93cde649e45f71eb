//! Builds the team → repositories inventory, either from the service catalog
//! or from a static data document.

use tracing::{debug, error, info};

use crate::build::{RepositoryService, TeamServices};
use crate::contract::{CatalogEntry, ServiceCatalog};

/// Slug segment value used by catalog links that point at the workspace
/// itself rather than at a repository.
const WORKSPACE_PLACEHOLDER: &str = "workspace";

/// Page through the catalog until it returns an empty page.
///
/// A failing page stops paging; everything collected before it is kept and
/// returned as the full inventory.
pub async fn collect_services<S>(catalog: &S) -> TeamServices
where
    S: ServiceCatalog + ?Sized,
{
    info!("Retrieving active services");
    let mut teams = TeamServices::new();
    let mut page = 0u32;

    loop {
        let result = match catalog.list_page(page).await {
            Ok(result) => result,
            Err(e) => {
                error!(page, error = %e, "Catalog page failed, keeping services collected so far");
                break;
            }
        };
        if result.is_empty() {
            debug!(page, "Catalog returned an empty page");
            break;
        }
        for entry in &result.entries {
            record_entry(&mut teams, entry);
        }
        page += 1;
    }

    info!(
        teams = teams.len(),
        services = teams.values().map(Vec::len).sum::<usize>(),
        "Active services retrieved"
    );
    teams
}

/// Register the entry's team, and its repository when the link names one.
fn record_entry(teams: &mut TeamServices, entry: &CatalogEntry) {
    let services = teams.entry(entry.team.clone()).or_default();
    match repository_slug(&entry.repository_url) {
        Some(slug) => services.push(RepositoryService {
            slug: slug.to_string(),
            url: entry.repository_url.clone(),
            team: entry.team.clone(),
        }),
        None => debug!(
            team = %entry.team,
            url = %entry.repository_url,
            "Catalog link does not name a repository"
        ),
    }
}

/// Slug from a `https://<host>/<workspace>/<slug>[/...]` link.
pub fn repository_slug(url: &str) -> Option<&str> {
    match url.split('/').nth(4) {
        Some(slug) if !slug.is_empty() && slug != WORKSPACE_PLACEHOLDER => Some(slug),
        _ => None,
    }
}

/// Parse a static inventory document:
/// `{ "<team>": [ { "RepositorySlug": "...", "RepositoryUrl": "..." } ] }`.
pub fn services_from_document(document: &str) -> Result<TeamServices, serde_json::Error> {
    let mut teams: TeamServices = serde_json::from_str(document)?;
    for (team, services) in teams.iter_mut() {
        for service in services.iter_mut() {
            service.team = team.clone();
        }
    }
    Ok(teams)
}
