use std::sync::Arc;

use eir_core::StateStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the store is only ever read here.
#[derive(Clone)]
pub struct AppState {
    /// State file written by the watch loop.
    pub store: Arc<StateStore>,
}

impl AppState {
    pub fn new(store: StateStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
