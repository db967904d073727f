//! Handlers for the `/users` resource.
//!
//! Bodies arrive as untyped JSON. Each field is checked on its own so a
//! failure names the offending field. Responses never include the password.

use agora_core::email::Email;
use agora_core::error::CoreError;
use agora_core::user::{normalize_name, normalize_username};
use agora_db::models::user::{CreateUser, EditUser, UserResponse};
use agora_db::repositories::UserRepo;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::extract::{EmailParam, JsonBody, UserIdPath};
use crate::response::{success, EnvelopeResponse};
use crate::state::AppState;

const FIELD_EMAIL: &str = "email";
const FIELD_USERNAME: &str = "username";
const FIELD_FIRST_NAME: &str = "firstName";
const FIELD_LAST_NAME: &str = "lastName";

/// POST /users, POST /users/new
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<EnvelopeResponse<UserResponse>> {
    let input = parse_create_user(&body)?;
    let user = UserRepo::create(&state.pool, &input).await?;
    Ok(success(StatusCode::CREATED, UserResponse::from(user)))
}

/// GET /users?email=
pub async fn get_user_by_email(
    State(state): State<AppState>,
    EmailParam(email): EmailParam,
) -> AppResult<EnvelopeResponse<UserResponse>> {
    let user = UserRepo::get_by_email(&state.pool, &email).await?;
    Ok(success(StatusCode::OK, UserResponse::from(user)))
}

/// PUT /users/edit/{userId}
///
/// A missing `email` keeps the stored address. Body fields are checked
/// before the id, so a request with both wrong reports the field.
pub async fn edit_user(
    State(state): State<AppState>,
    id: Result<UserIdPath, AppError>,
    JsonBody(body): JsonBody,
) -> AppResult<EnvelopeResponse<UserResponse>> {
    let input = parse_edit_user(&body)?;
    let UserIdPath(id) = id?;
    let user = UserRepo::edit(&state.pool, id, &input).await?;
    Ok(success(StatusCode::OK, UserResponse::from(user)))
}

// ---------------------------------------------------------------------------
// Body parsing
// ---------------------------------------------------------------------------

pub fn parse_create_user(body: &Value) -> Result<CreateUser, CoreError> {
    let email = string_field(body, FIELD_EMAIL)?
        .ok_or(CoreError::InvalidField(FIELD_EMAIL))?;
    let email = Email::parse(email)?;
    let (username, first_name, last_name) = parse_names(body)?;

    Ok(CreateUser {
        email,
        username,
        first_name,
        last_name,
    })
}

pub fn parse_edit_user(body: &Value) -> Result<EditUser, CoreError> {
    let email = string_field(body, FIELD_EMAIL)?
        .map(Email::parse)
        .transpose()?;
    let (username, first_name, last_name) = parse_names(body)?;

    Ok(EditUser {
        email,
        username,
        first_name,
        last_name,
    })
}

fn parse_names(body: &Value) -> Result<(String, String, String), CoreError> {
    let username = normalize_username(required_string(body, FIELD_USERNAME)?)?;
    let first_name = normalize_name(
        FIELD_FIRST_NAME,
        required_string(body, FIELD_FIRST_NAME)?,
    )?;
    let last_name = normalize_name(FIELD_LAST_NAME, required_string(body, FIELD_LAST_NAME)?)?;
    Ok((username, first_name, last_name))
}

fn required_string<'a>(body: &'a Value, field: &'static str) -> Result<&'a str, CoreError> {
    string_field(body, field)?.ok_or(CoreError::InvalidField(field))
}

/// `None` for an absent or null field, an error for any non-string value.
/// Non-object bodies have no fields.
fn string_field<'a>(body: &'a Value, field: &'static str) -> Result<Option<&'a str>, CoreError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(CoreError::InvalidField(field)),
    }
}
