use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::server::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Static API key guard.
///
/// Passes the request on only when `x-api-key` equals the configured key.
/// With no key configured, or a blank one, every request is refused.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match (state.api_key.as_deref(), provided) {
        (Some(expected), Some(given)) if !expected.trim().is_empty() && expected == given => {
            Ok(next.run(req).await)
        }
        _ => {
            tracing::warn!("Rejected request to {}: bad API key", req.uri().path());
            Err(ApiError::Forbidden("Could not validate API key".to_string()))
        }
    }
}
