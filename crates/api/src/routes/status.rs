//! Latest persisted host state, as JSON and as an HTML page.
//!
//! Both handlers read the state file on every request rather than
//! re-reading the probe results, so they always show what the watch loop
//! last saved. An absent or unreadable file shows the default `UNKNOWN`
//! snapshot.

use axum::extract::State;
use axum::response::Html;
use axum::{routing::get, Json, Router};
use eir_core::Snapshot;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::ui;

async fn load_snapshot(state: &AppState) -> ApiResult<Snapshot> {
    let store = state.store.clone();
    Ok(tokio::task::spawn_blocking(move || store.load()).await?)
}

/// GET / -- persisted snapshot as JSON.
async fn status_json(State(state): State<AppState>) -> ApiResult<Json<Snapshot>> {
    tracing::info!("Reporting status via HTTP");
    Ok(Json(load_snapshot(&state).await?))
}

/// GET /ui -- persisted snapshot rendered as HTML.
async fn status_ui(State(state): State<AppState>) -> ApiResult<Html<String>> {
    tracing::info!("Serving the web UI");
    let snapshot = load_snapshot(&state).await?;
    Ok(Html(ui::render(&snapshot)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(status_json))
        .route("/ui", get(status_ui))
}
