use bends::datadog::DatadogCatalog;
use bends_core::contract::ServiceCatalog;
use bends_core::inventory::collect_services;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn definition(team: &str, repo: &str) -> serde_json::Value {
    json!({
        "attributes": {
            "schema": {
                "team": team,
                "links": [
                    {"name": "Runbook", "type": "runbook", "url": "https://wiki.example.com/runbook"},
                    {"name": "Source", "type": "repo", "url": format!("https://bitbucket.org/acme/{repo}")}
                ]
            }
        }
    })
}

async fn mount_page(server: &MockServer, page: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v2/services/definitions"))
        .and(query_param("schema_version", "v2.1"))
        .and(query_param("page[number]", page))
        .and(header("DD-API-KEY", "api-key"))
        .and(header("DD-APPLICATION-KEY", "app-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn uses_last_link_of_each_definition() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "0",
        json!({"data": [definition("core", "ledger"), {"attributes": {"schema": {"links": []}}}]}),
    )
    .await;

    let catalog = DatadogCatalog::new(server.uri(), "api-key", "app-key");
    let page = catalog.list_page(0).await.expect("page loads");
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].team, "core");
    assert_eq!(page.entries[0].repository_url, "https://bitbucket.org/acme/ledger");
    assert_eq!(page.skipped, 1);
}

#[tokio::test]
async fn errors_body_is_a_failed_page() {
    let server = MockServer::start().await;
    mount_page(&server, "0", json!({"errors": ["Forbidden"]})).await;

    let catalog = DatadogCatalog::new(server.uri(), "api-key", "app-key");
    let err = catalog.list_page(0).await.expect_err("errors body must fail");
    assert!(err.to_string().contains("Forbidden"));
}

#[tokio::test]
async fn collects_every_page_until_empty() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "0",
        json!({"data": [definition("core", "ledger"), definition("web", "storefront")]}),
    )
    .await;
    mount_page(&server, "1", json!({"data": [definition("core", "billing")]})).await;
    mount_page(&server, "2", json!({"data": []})).await;

    let catalog = DatadogCatalog::new(server.uri(), "api-key", "app-key");
    let teams = collect_services(&catalog).await;
    let core: Vec<_> = teams["core"].iter().map(|s| s.slug.as_str()).collect();
    assert_eq!(core, vec!["ledger", "billing"]);
    assert_eq!(teams["web"][0].slug, "storefront");
}
