//! Request-level middleware.
//!
//! - [`error_log::log_errors`] -- writes one log entry per failed request.
//! - [`timeout::envelope_timeouts`] -- turns timed-out requests into failure envelopes.

pub mod error_log;
pub mod timeout;

pub use error_log::{log_errors, ErrorReport};
pub use timeout::envelope_timeouts;
