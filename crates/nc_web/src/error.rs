use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

pub enum ApiError {
    Forbidden,
    NothingFound,
    Internal(nc_core::Error),
}

impl From<nc_core::Error> for ApiError {
    fn from(e: nc_core::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Invalid API Key".to_string()),
            ApiError::NothingFound => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Crawl failed or found no articles".to_string(),
            ),
            ApiError::Internal(e) => {
                error!("Request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
