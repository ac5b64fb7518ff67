mod common;

use common::TestApp;
use linkpulse::domain::click_pipeline::PipelineConfig;
use linkpulse::domain::repositories::{ClickRepository, LinkRepository};
use serde_json::{Value, json};
use std::time::Duration;

#[tokio::test]
async fn test_create_redirect_and_count() {
    let app = TestApp::with_pipeline(PipelineConfig::new(10, 2));

    let created: Value = app
        .server
        .post("/api/v1/links")
        .json(&json!({ "long_url": "https://example.com/page" }))
        .await
        .json();
    let code = created["short_code"].as_str().unwrap().to_string();

    for _ in 0..3 {
        let response = app.server.get(&format!("/{code}")).await;
        assert_eq!(response.status_code(), 302);
        assert_eq!(response.header("location"), "https://example.com/page");
    }

    let report = app.pipeline.shutdown(Duration::from_secs(5)).await;
    assert!(report.drained);

    let link = app.store.find_by_code(&code).await.unwrap().unwrap();
    assert_eq!(app.store.count_by_link(link.id).await.unwrap(), 3);

    let stats: Value = app
        .server
        .get(&format!("/api/v1/links/{code}/stats"))
        .await
        .json();
    assert_eq!(stats["total_clicks"], 3);
}

#[tokio::test]
async fn test_many_redirects_persist_exactly_once() {
    let app = TestApp::with_pipeline(PipelineConfig::new(200, 4));
    let first = app.insert_link("many01", "https://example.com/1").await;
    let second = app.insert_link("many02", "https://example.com/2").await;

    for i in 0..60 {
        let code = if i % 3 == 0 { "many02" } else { "many01" };
        app.server.get(&format!("/{code}")).await;
    }

    app.pipeline.shutdown(Duration::from_secs(5)).await;

    assert_eq!(app.store.count_by_link(first.id).await.unwrap(), 40);
    assert_eq!(app.store.count_by_link(second.id).await.unwrap(), 20);

    let mut ids: Vec<i64> = app
        .store
        .clicks_for(first.id)
        .into_iter()
        .chain(app.store.clicks_for(second.id))
        .map(|c| c.id)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 60);
}
