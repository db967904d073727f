//! Domain error taxonomy.
//!
//! Every failure that can reach a caller is a [`CoreError`]. Each variant
//! belongs to exactly one [`ErrorKind`] and carries a fixed HTTP status code,
//! so the boundary layer never has to guess how to report it.

use std::fmt;

use crate::email::Email;
use crate::user::UserId;

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;

/// Canonical reason phrase for the status codes used by the taxonomy.
pub fn status_text(code: u16) -> &'static str {
    match code {
        STATUS_BAD_REQUEST => "Bad Request",
        STATUS_NOT_FOUND => "Not Found",
        STATUS_CONFLICT => "Conflict",
        STATUS_INTERNAL_SERVER_ERROR => "Internal Server Error",
        _ => "Unknown",
    }
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller's input is malformed or missing. Reported as 400.
    ValidationError,
    /// A business rule was violated (conflict) or the target does not exist.
    /// Reported as 404 or 409.
    ApplicationError,
    /// An infrastructure fault or a defect. Reported as 500, details are
    /// only ever written to the operational log.
    ServerError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::ApplicationError => "ApplicationError",
            ErrorKind::ServerError => "ServerError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The key a user lookup was performed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    Id(UserId),
    Email(Email),
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserKey::Id(id) => write!(f, "id {id}"),
            UserKey::Email(email) => write!(f, "email \"{email}\""),
        }
    }
}

// ---------------------------------------------------------------------------
// CoreError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    /// A request field is missing, has the wrong type, or is out of bounds.
    /// Carries the wire name of the field.
    #[error("Invalid {0} format")]
    InvalidField(&'static str),

    #[error("User not found for {0}")]
    UserNotFound(UserKey),

    #[error("Email \"{0}\" already taken")]
    EmailAlreadyTaken(Email),

    #[error("Username \"{0}\" already taken")]
    UsernameAlreadyTaken(String),

    /// A persisted row does not have the expected shape. This means the
    /// stored data is corrupt, never that the caller did something wrong.
    #[error("Invalid user row object: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidEmail(_) | CoreError::InvalidField(_) => ErrorKind::ValidationError,
            CoreError::UserNotFound(_)
            | CoreError::EmailAlreadyTaken(_)
            | CoreError::UsernameAlreadyTaken(_) => ErrorKind::ApplicationError,
            CoreError::Decode(_) | CoreError::Internal(_) => ErrorKind::ServerError,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::InvalidEmail(_) | CoreError::InvalidField(_) => STATUS_BAD_REQUEST,
            CoreError::UserNotFound(_) => STATUS_NOT_FOUND,
            CoreError::EmailAlreadyTaken(_) | CoreError::UsernameAlreadyTaken(_) => {
                STATUS_CONFLICT
            }
            CoreError::Decode(_) | CoreError::Internal(_) => STATUS_INTERNAL_SERVER_ERROR,
        }
    }

    pub fn status_text(&self) -> &'static str {
        status_text(self.status_code())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
