//! Health and metrics probe tests for invoice-service.

mod common;

use common::TestApp;
use serde_json::Value;

#[tokio::test]
async fn health_check_reports_ok_with_version() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to call health endpoint");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Invalid health body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "invoice-service");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    app.cleanup().await;
}

#[tokio::test]
async fn readiness_check_reports_ready() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/ready", app.address))
        .send()
        .await
        .expect("Failed to call readiness endpoint");

    assert_eq!(response.status(), 200);

    app.cleanup().await;
}

#[tokio::test]
async fn metrics_endpoint_serves_prometheus_text() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .expect("Failed to call metrics endpoint");

    assert_eq!(response.status(), 200);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    app.cleanup().await;
}
