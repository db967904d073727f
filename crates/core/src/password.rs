//! Server-side password generation.
//!
//! Users never choose a password: one is generated when the account is
//! created and is never exposed through any response.

use rand::Rng;

/// Length of every generated password.
pub const GENERATED_PASSWORD_LENGTH: usize = 10;

/// Generate a random alphanumeric password of [`GENERATED_PASSWORD_LENGTH`]
/// characters.
///
/// Draws from the thread-local CSPRNG, which is seeded from the OS.
pub fn generate_password() -> String {
    generate_password_with_length(GENERATED_PASSWORD_LENGTH)
}

pub fn generate_password_with_length(length: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
