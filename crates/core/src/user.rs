//! The `User` entity, its identity type, and the field rules shared by every
//! write path.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use validator::ValidateLength;

use crate::email::Email;
use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum username length in characters, after trimming.
pub const MAX_USERNAME_LENGTH: u64 = 50;

/// Maximum first/last name length in characters, after trimming.
pub const MAX_NAME_LENGTH: u64 = 100;

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// Identity of a persisted user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(DbId);

impl UserId {
    /// Brand a raw key as a user id. No range check happens here; ids read
    /// from storage are trusted, and ids from the outside world go through
    /// [`UserId::parse_positive`].
    pub const fn new(value: DbId) -> Self {
        Self(value)
    }

    /// Parse an id supplied by a caller (e.g. a path segment). Anything that
    /// is not a positive integer is rejected as an invalid `id`.
    pub fn parse_positive(raw: &str) -> Result<Self, CoreError> {
        match raw.parse::<DbId>() {
            Ok(value) if value > 0 => Ok(Self(value)),
            _ => Err(CoreError::InvalidField("id")),
        }
    }

    pub const fn get(self) -> DbId {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_positive(s)
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered user.
///
/// Contains the generated password -- never serialize this to API responses
/// directly. `id` and `password` are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

/// Trim a username and check it is 1..=50 characters (Unicode scalar
/// values, so one emoji is one character).
pub fn normalize_username(raw: &str) -> Result<String, CoreError> {
    normalize_bounded("username", raw, MAX_USERNAME_LENGTH)
}

/// Trim a first or last name and check it is 1..=100 characters. `field` is
/// the wire name reported on failure (`firstName` / `lastName`).
pub fn normalize_name(field: &'static str, raw: &str) -> Result<String, CoreError> {
    normalize_bounded(field, raw, MAX_NAME_LENGTH)
}

fn normalize_bounded(field: &'static str, raw: &str, max: u64) -> Result<String, CoreError> {
    let trimmed = raw.trim().to_string();
    if trimmed.validate_length(Some(1), Some(max), None) {
        Ok(trimmed)
    } else {
        Err(CoreError::InvalidField(field))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
