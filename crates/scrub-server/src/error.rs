use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scrub_core::CoreError;
use serde::Serialize;

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Forbidden(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::UnknownSource(_) => ApiError::NotFound(e.to_string()),
            CoreError::UnsupportedStrategy(_) | CoreError::InvalidInput(_) => {
                ApiError::BadRequest(e.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CoreError::UnknownSource("jira".into()), StatusCode::NOT_FOUND),
            (
                CoreError::UnsupportedStrategy("rot13".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::DetectionFailure("timeout".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CoreError::ConnectorFailure("503".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).into_response().status(), status);
        }
    }
}
