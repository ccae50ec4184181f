use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects the request with 403 before any handler, store or fetcher runs.
pub async fn require_api_key(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if !state.api_key_matches(provided) {
        warn!("Rejected {} {}: invalid API key", request.method(), request.uri().path());
        return ApiError::Forbidden.into_response();
    }
    next.run(request).await
}
