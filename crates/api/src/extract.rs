//! Request extractors that reject with [`AppError`], so every failure leaves
//! the server as a failure envelope.

use agora_core::email::Email;
use agora_core::error::CoreError;
use agora_core::user::UserId;
use axum::extract::{FromRequest, FromRequestParts, Json, Path, Query, Request};
use axum::http::request::Parts;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, INVALID_BODY_MESSAGE};

/// Any syntactically valid JSON body.
///
/// Field-level validation happens in the handlers so each field can be
/// reported by name. A body that is not JSON at all is rejected with
/// "Invalid request body".
#[derive(Debug)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "Rejected request body");
                AppError::BadRequest(INVALID_BODY_MESSAGE.to_string())
            })?;
        Ok(JsonBody(value))
    }
}

/// The `userId` path segment, parsed as a positive integer.
#[derive(Debug, Clone, Copy)]
pub struct UserIdPath(pub UserId);

impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Core(CoreError::InvalidField("id")))?;

        Ok(UserIdPath(UserId::parse_positive(&raw)?))
    }
}

#[derive(Debug, Deserialize)]
struct EmailQuery {
    email: Option<String>,
}

/// The `email` query parameter, validated.
///
/// A missing or unreadable parameter is reported as an invalid email field;
/// a present but malformed one as an invalid email.
#[derive(Debug, Clone)]
pub struct EmailParam(pub Email);

impl<S> FromRequestParts<S> for EmailParam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<EmailQuery>::try_from_uri(&parts.uri)
            .map_err(|_| AppError::Core(CoreError::InvalidField("email")))?;

        let raw = query
            .email
            .filter(|e| !e.is_empty())
            .ok_or(CoreError::InvalidField("email"))?;

        Ok(EmailParam(Email::parse(raw)?))
    }
}
