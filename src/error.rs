use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use http::header::CACHE_CONTROL;
use serde_json::json;

use crate::config::CACHE_CONTROL_ERROR;
use crate::openfda::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("openFDA request failed: {0}")]
    Upstream(#[from] FetchError),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidQuery(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Upstream(error) => {
                tracing::error!(%error, "Upstream openFDA failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "openFDA upstream unavailable".to_string(),
                )
            }
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": message,
        }));

        (status, [(CACHE_CONTROL, CACHE_CONTROL_ERROR)], body).into_response()
    }
}
