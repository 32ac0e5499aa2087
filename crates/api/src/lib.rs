//! Eir status server library.
//!
//! Read-only HTTP view of the state file written by the watch loop:
//! `GET /` (JSON), `GET /ui` (HTML) and `GET /health`.

pub mod error;
pub mod routes;
pub mod state;
pub mod ui;

use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use state::AppState;

/// Build the status server router with its tracing layer.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::status::router())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
