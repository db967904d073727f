//! Pure domain layer for the Agora forum backend.
//!
//! Holds the branded value types ([`email::Email`], [`user::UserId`]), the
//! [`user::User`] entity with its field rules, the server-side password
//! generator, and the error taxonomy every other crate reports through.
//! This crate has no database or HTTP dependencies.

pub mod email;
pub mod error;
pub mod password;
pub mod types;
pub mod user;
