use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use snaplink_shortener::ShortenerError;
use thiserror::Error;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

pub const INVALID_URL_MESSAGE: &str = "A valid URL is required.";
pub const NOT_FOUND_MESSAGE: &str = "Short URL not found.";
pub const INTERNAL_MESSAGE: &str = "Something went wrong.";
pub const UNKNOWN_ROUTE_MESSAGE: &str = "Not found.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed.";

/// Errors a handler can answer with.
///
/// Every variant renders as `{"error": "<message>"}`. Internal failures keep
/// their cause for the log only; clients always see the generic message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("request body does not carry a valid url")]
    InvalidUrl,
    #[error("short url not found")]
    NotFound,
    #[error("no route matches the request")]
    UnknownRoute,
    #[error("route does not accept the request method")]
    MethodNotAllowed,
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidUrl => StatusCode::BAD_REQUEST,
            AppError::NotFound | AppError::UnknownRoute => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AppError::InvalidUrl => INVALID_URL_MESSAGE,
            AppError::NotFound => NOT_FOUND_MESSAGE,
            AppError::UnknownRoute => UNKNOWN_ROUTE_MESSAGE,
            AppError::MethodNotAllowed => METHOD_NOT_ALLOWED_MESSAGE,
            AppError::Internal(_) => INTERNAL_MESSAGE,
        }
    }
}

impl From<ShortenerError> for AppError {
    fn from(error: ShortenerError) -> Self {
        match error {
            ShortenerError::InvalidUrl(_) => AppError::InvalidUrl,
            ShortenerError::NotFound(_) => AppError::NotFound,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(cause) = &self {
            error!(cause = %cause, "request failed");
        }

        let body = ErrorResponse {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaplink_core::StorageError;

    #[test]
    fn shortener_errors_map_to_statuses() {
        let cases = [
            (
                ShortenerError::InvalidUrl("empty".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ShortenerError::NotFound("abc123".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                ShortenerError::AllocationExhausted { attempts: 10 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ShortenerError::Storage(StorageError::Timeout("pool".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).status(), status);
        }
    }

    #[test]
    fn internal_error_hides_cause() {
        let error = AppError::Internal("connection refused".to_string());
        assert_eq!(error.message(), "Something went wrong.");
    }
}
