mod common;

use common::{BASE_URL, TestApp};
use linkpulse::domain::repositories::LinkRepository;
use serde_json::{Value, json};
use std::collections::HashSet;

#[tokio::test]
async fn test_create_link_success() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/links")
        .json(&json!({ "long_url": "https://example.com/page" }))
        .await;

    assert_eq!(response.status_code(), 201);

    let body: Value = response.json();
    let code = body["short_code"].as_str().unwrap();

    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(body["long_url"], "https://example.com/page");
    assert_eq!(body["full_short_url"], format!("{BASE_URL}/{code}"));

    let stored = app.store.find_by_code(code).await.unwrap().unwrap();
    assert_eq!(stored.long_url, "https://example.com/page");
}

#[tokio::test]
async fn test_create_link_keeps_url_verbatim() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/links")
        .json(&json!({ "long_url": "  https://Example.com/Path?b=2&a=1  " }))
        .await;

    assert_eq!(response.status_code(), 201);

    let body: Value = response.json();
    assert_eq!(body["long_url"], "https://Example.com/Path?b=2&a=1");
}

#[tokio::test]
async fn test_create_link_invalid_url() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/links")
        .json(&json!({ "long_url": "not-a-valid-url" }))
        .await;

    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(app.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_link_unsupported_scheme() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/links")
        .json(&json!({ "long_url": "ftp://files.example.com/data.bin" }))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_link_malformed_body() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/links")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_created_codes_are_unique() {
    let app = TestApp::new();
    let mut codes = HashSet::new();

    for i in 0..50 {
        let response = app
            .server
            .post("/api/v1/links")
            .json(&json!({ "long_url": format!("https://example.com/{i}") }))
            .await;

        assert_eq!(response.status_code(), 201);

        let body: Value = response.json();
        codes.insert(body["short_code"].as_str().unwrap().to_string());
    }

    assert_eq!(codes.len(), 50);
    assert_eq!(app.store.list_all().await.unwrap().len(), 50);
}

#[tokio::test]
async fn test_same_url_twice_gets_two_codes() {
    let app = TestApp::new();

    let first: Value = app
        .server
        .post("/api/v1/links")
        .json(&json!({ "long_url": "https://example.com" }))
        .await
        .json();
    let second: Value = app
        .server
        .post("/api/v1/links")
        .json(&json!({ "long_url": "https://example.com" }))
        .await
        .json();

    assert_ne!(first["short_code"], second["short_code"]);
}
