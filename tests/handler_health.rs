mod common;

use common::TestApp;
use serde_json::Value;
use std::time::Duration;

#[tokio::test]
async fn test_health_ok() {
    let app = TestApp::new();

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["click_queue"]["status"], "ok");
    assert_eq!(
        body["checks"]["click_queue"]["message"],
        "0/100 queued, 2 workers"
    );
}

#[tokio::test]
async fn test_health_degraded_after_pipeline_shutdown() {
    let app = TestApp::new();
    app.pipeline.shutdown(Duration::from_secs(1)).await;

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), 503);

    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["click_queue"]["status"], "error");
}
