use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use eir_core::StateStore;
use http_body_util::BodyExt;
use tower::ServiceExt;

use eir_api::state::AppState;

/// Build the full status router backed by the state file at `path`.
pub fn build_test_app(path: &std::path::Path) -> Router {
    eir_api::app(AppState::new(StateStore::new(path)))
}

/// Issue a GET request against the router.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as a string.
pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
