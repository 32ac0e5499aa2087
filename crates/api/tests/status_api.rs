//! Integration tests for the status server routes.

mod common;

use axum::http::StatusCode;
use common::{body_json, body_text, get};
use eir_core::{ProbeResult, Snapshot, StateStore, Status};

fn persisted(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("status.yml");
    let mut snapshot = Snapshot::new("web-1", "0.1.0");
    snapshot.record(ProbeResult::new("postfix", Status::Critical, "queue stuck"));
    snapshot.record(ProbeResult::new("disk", Status::Ok, "<42%>"));
    StateStore::new(&path).save(&snapshot).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Test: GET / returns the persisted snapshot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_returns_persisted_snapshot_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(&persisted(dir.path()));

    let response = get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let json = body_json(response).await;
    assert_eq!(json["Status"], "CRITICAL");
    assert_eq!(json["Hostname"], "web-1");
    assert_eq!(json["Version"], "0.1.0");
    assert_eq!(json["Details"].as_array().unwrap().len(), 2);
    assert_eq!(json["Details"][0]["Name"], "postfix");
    assert_eq!(json["Details"][0]["Text"], "queue stuck");
}

// ---------------------------------------------------------------------------
// Test: GET / tolerates an absent state file
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_without_state_file_is_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(&dir.path().join("absent.yml"));

    let response = get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["Status"], "UNKNOWN");
    assert_eq!(json["Details"].as_array().unwrap().len(), 0);
    assert!(json["Hostname"].is_string());
}

// ---------------------------------------------------------------------------
// Test: GET /ui renders HTML with escaped probe text
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ui_renders_html() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(&persisted(dir.path()));

    let response = get(app, "/ui").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let html = body_text(response).await;
    assert!(html.contains("postfix"));
    assert!(html.contains("&lt;42%&gt;"));
}

// ---------------------------------------------------------------------------
// Test: GET /health and unknown routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(&dir.path().join("status.yml"));

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(&dir.path().join("status.yml"));

    let response = get(app, "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
