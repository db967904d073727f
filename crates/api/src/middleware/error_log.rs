//! Operational logging of failed requests.
//!
//! Error responses carry an [`ErrorReport`] extension with the full cause.
//! [`log_errors`] picks it up on the way out and logs it together with the
//! request method and URL. The client only ever sees the public message.

use agora_core::error::ErrorKind;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Diagnostic detail attached to an error response.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    /// Full error text, including details hidden from the client.
    pub detail: String,
}

/// Log every response that carries an [`ErrorReport`].
///
/// Server errors log at `error`, validation and application errors at `warn`.
pub async fn log_errors(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    if let Some(report) = response.extensions().get::<ErrorReport>() {
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("Unknown");

        match report.kind {
            ErrorKind::ServerError => tracing::error!(
                kind = %report.kind,
                %method,
                route = %uri,
                status = status.as_u16(),
                status_text,
                message = %report.detail,
                "Request failed",
            ),
            _ => tracing::warn!(
                kind = %report.kind,
                %method,
                route = %uri,
                status = status.as_u16(),
                status_text,
                message = %report.detail,
                "Request rejected",
            ),
        }
    }

    response
}
