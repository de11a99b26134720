mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn(3).await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "sentiment-service");
}

#[tokio::test]
async fn readiness_check_works() {
    let app = TestApp::spawn(3).await;

    let response = app
        .client
        .get(format!("{}/ready", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
}

#[tokio::test]
async fn metrics_endpoint_returns_prometheus_format() {
    let app = TestApp::spawn(4).await;
    app.score("warming up the counters").await;

    let response = app
        .client
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let content_type = response
        .headers()
        .get("content-type")
        .expect("Missing content-type header")
        .to_str()
        .expect("Invalid content-type");
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let app = TestApp::spawn(3).await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.headers()["x-request-id"], "abc-123");

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    let generated = response.headers()["x-request-id"]
        .to_str()
        .expect("Invalid request id");
    assert_eq!(generated.len(), 36);
}

#[tokio::test]
async fn cors_allows_any_origin_by_default() {
    let app = TestApp::spawn(3).await;

    let response = app
        .client
        .get(format!("{}/history", app.address))
        .header("origin", "http://frontend.test")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn health_and_readiness_fail_when_database_is_closed() {
    let app = TestApp::spawn(3).await;
    app.db.pool().close().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 503);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "unhealthy");

    let response = app
        .client
        .get(format!("{}/ready", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 503);
}
