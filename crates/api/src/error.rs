use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Error type for status server handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Reading the state file on the blocking pool failed.
    #[error("State read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Internal error");
        let body = json!({
            "error": "An internal error occurred",
            "code": "INTERNAL_ERROR",
        });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_error_maps_to_500() {
        let handle: tokio::task::JoinHandle<()> = tokio::spawn(async { panic!("boom") });
        let join_err = handle.await.unwrap_err();
        let response = ApiError::from(join_err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
