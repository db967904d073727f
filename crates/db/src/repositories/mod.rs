//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept the caller-owned `&DbPool` as the first argument.

pub mod user_repo;

pub use user_repo::UserRepo;
