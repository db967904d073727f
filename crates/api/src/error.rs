use agora_core::error::{CoreError, ErrorKind};
use agora_db::RepoError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::middleware::ErrorReport;
use crate::response::Envelope;

/// Message sent to clients for every server-side failure. The real cause is
/// only written to the log.
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

/// Message sent when the request body is not valid JSON.
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce a failure envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `agora_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No route matches the request path.
    #[error("No route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    /// The path exists but not for this method.
    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed { method: String, path: String },

    /// The request ran past the configured timeout.
    #[error("Request timed out")]
    RequestTimeout,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Core(core) => AppError::Core(core),
            RepoError::Database(db) => AppError::Database(db),
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Core(core) => core.kind(),
            AppError::BadRequest(_) => ErrorKind::ValidationError,
            AppError::RouteNotFound { .. } | AppError::MethodNotAllowed { .. } => {
                ErrorKind::ApplicationError
            }
            AppError::Database(_) | AppError::RequestTimeout => ErrorKind::ServerError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Core(core) => StatusCode::from_u16(core.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that may be shown to a client. Server errors other than a
    /// timeout are replaced by [`INTERNAL_SERVER_ERROR_MESSAGE`]; routing
    /// errors only show the status text.
    pub fn public_message(&self) -> String {
        match self {
            AppError::RequestTimeout
            | AppError::RouteNotFound { .. }
            | AppError::MethodNotAllowed { .. } => {
                self.status().canonical_reason().unwrap_or("Unknown").to_string()
            }
            _ if self.kind() == ErrorKind::ServerError => {
                INTERNAL_SERVER_ERROR_MESSAGE.to_string()
            }
            AppError::BadRequest(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let report = ErrorReport {
            kind: self.kind(),
            detail: self.to_string(),
        };

        let mut response =
            (status, Json(Envelope::<()>::failure(self.public_message()))).into_response();
        response.extensions_mut().insert(report);
        response
    }
}
