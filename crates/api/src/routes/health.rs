use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: eir_core::host::VERSION,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
