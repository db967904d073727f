//! Persisted row shapes and write DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` row struct keyed by storage column names, with the codec to
//!   and from the domain entity
//! - The create / edit DTOs consumed by the matching repository

pub mod user;
