//! Integration tests for the resolve endpoint.

mod helpers;

use helpers::{setup_test_app, setup_test_app_with_mode};
use samplegate_core::DeliveryMode;
use serde_json::Value;

const POINTER_JANE: &str =
    r#"{"key":"videos/jane_acme_com__tour.mp4","company":"Acme Homes"}"#;

#[tokio::test]
async fn test_missing_id_returns_structured_error() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/sample").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["error"], "MISSING_ID");
    assert!(body["link"].is_null());
}

#[tokio::test]
async fn test_unknown_id_returns_pointer_not_found_with_link() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/api/sample")
        .add_query_param("id", "nobody_nowhere_com")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["error"], "POINTER_NOT_FOUND");
    assert_eq!(body["link"], "https://samples.test/p/?id=nobody_nowhere_com");
    assert!(body["company"].is_null());
    assert!(body.get("signedUrl").is_none());
}

#[tokio::test]
async fn test_empty_key_carries_company() {
    let app = setup_test_app().await;
    app.put_pointer("jane_acme_com", r#"{"key":"","company":"Acme Homes"}"#)
        .await;

    let response = app
        .client()
        .get("/api/sample")
        .add_query_param("id", "jane_acme_com")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["error"], "EMPTY_KEY");
    assert_eq!(body["company"], "Acme Homes");
}

#[tokio::test]
async fn test_resolves_exact_key() {
    let app = setup_test_app().await;
    app.put_object("videos/jane_acme_com__tour.mp4", &[0u8; 1000])
        .await;
    app.put_pointer("jane_acme_com", POINTER_JANE).await;

    let response = app
        .client()
        .get("/api/sample")
        .add_query_param("id", "jane_acme_com")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body.get("error").is_none());
    assert_eq!(body["foundKey"], "videos/jane_acme_com__tour.mp4");
    assert_eq!(body["company"], "Acme Homes");
    assert_eq!(body["link"], "https://samples.test/p/?id=jane_acme_com");
    assert!(body["signedUrl"]
        .as_str()
        .unwrap()
        .contains("jane_acme_com__tour.mp4"));
}

#[tokio::test]
async fn test_resolves_nested_key_layout() {
    let app = setup_test_app().await;
    // Upload tool quirk: the filename repeated as a child of a directory
    // named after it.
    app.put_object(
        "videos/jane_acme_com__tour.mp4/jane_acme_com__tour.mp4",
        b"video bytes",
    )
    .await;
    app.put_pointer("jane_acme_com", POINTER_JANE).await;

    let response = app
        .client()
        .get("/api/sample")
        .add_query_param("id", "jane_acme_com")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body.get("error").is_none());
    assert_eq!(
        body["foundKey"],
        "videos/jane_acme_com__tour.mp4/jane_acme_com__tour.mp4"
    );
}

#[tokio::test]
async fn test_resolves_via_prefix_listing() {
    let app = setup_test_app().await;
    app.put_object("videos/jane_acme_com__tour.mp4/other-name.mp4", b"video")
        .await;
    app.put_pointer("jane_acme_com", POINTER_JANE).await;

    let response = app
        .client()
        .get("/api/sample")
        .add_query_param("id", "jane_acme_com")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body["foundKey"],
        "videos/jane_acme_com__tour.mp4/other-name.mp4"
    );
}

#[tokio::test]
async fn test_object_missing_returns_wanted_key() {
    let app = setup_test_app().await;
    app.put_pointer("jane_acme_com", POINTER_JANE).await;

    let response = app
        .client()
        .get("/api/sample")
        .add_query_param("id", "jane_acme_com")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["error"], "OBJECT_NOT_FOUND");
    assert_eq!(body["wantedKey"], "videos/jane_acme_com__tour.mp4");
    assert_eq!(body["company"], "Acme Homes");
    assert_eq!(body["link"], "https://samples.test/p/?id=jane_acme_com");
}

#[tokio::test]
async fn test_raw_email_id_is_sanitized() {
    let app = setup_test_app().await;
    app.put_object("videos/jane_acme_com__tour.mp4", b"video")
        .await;
    app.put_pointer("jane_acme_com", POINTER_JANE).await;

    let response = app
        .client()
        .get("/api/sample")
        .add_query_param("id", "Jane@Acme.com")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body.get("error").is_none());
    assert_eq!(body["link"], "https://samples.test/p/?id=jane_acme_com");
}

#[tokio::test]
async fn test_stream_mode_returns_stream_url() {
    let app = setup_test_app_with_mode(DeliveryMode::Stream).await;
    app.put_object("videos/jane_acme_com__tour.mp4", b"video")
        .await;
    app.put_pointer("jane_acme_com", POINTER_JANE).await;

    let response = app
        .client()
        .get("/api/sample")
        .add_query_param("id", "jane_acme_com")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body.get("signedUrl").is_none());
    assert_eq!(
        body["streamUrl"],
        "/stream?key=videos/jane_acme_com__tour.mp4"
    );
}

#[tokio::test]
async fn test_resolve_is_idempotent() {
    let app = setup_test_app().await;
    app.put_object("videos/jane_acme_com__tour.mp4", b"video")
        .await;
    app.put_pointer("jane_acme_com", POINTER_JANE).await;

    let first: Value = app
        .client()
        .get("/api/sample")
        .add_query_param("id", "jane_acme_com")
        .await
        .json();
    let second: Value = app
        .client()
        .get("/api/sample")
        .add_query_param("id", "jane_acme_com")
        .await
        .json();

    assert_eq!(first["foundKey"], second["foundKey"]);
    assert_eq!(first["company"], second["company"]);
    assert_eq!(first["link"], second["link"]);
}

#[tokio::test]
async fn test_resolve_sets_no_store() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/api/sample")
        .add_query_param("id", "whoever")
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "no-store"
    );
}
