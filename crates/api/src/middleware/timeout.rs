//! Failure envelope for requests cut off by the timeout layer.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::middleware::ErrorReport;

/// Replace the empty 408 emitted by `TimeoutLayer` with
/// [`AppError::RequestTimeout`]. Must sit directly outside the timeout layer.
pub async fn envelope_timeouts(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let bare_timeout = response.status() == StatusCode::REQUEST_TIMEOUT
        && response.extensions().get::<ErrorReport>().is_none();
    if bare_timeout {
        return AppError::RequestTimeout.into_response();
    }

    response
}
