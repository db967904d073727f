//! Response envelope shared by every user endpoint.
//!
//! Successful responses carry `{"_tag": "success", "data": ...}` and failed
//! ones `{"_tag": "failure", "error": "<message>"}`. The absent side is never
//! serialized, not even as `null`.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Tagged success/failure envelope.
#[derive(Debug, Serialize)]
#[serde(tag = "_tag", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success { data: T },
    Failure { error: String },
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope::Success { data }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Envelope::Failure {
            error: error.into(),
        }
    }
}

/// Handler return shape for a successful envelope with an explicit status.
pub type EnvelopeResponse<T> = (StatusCode, Json<Envelope<T>>);

/// Wrap `data` in a success envelope sent with `status`.
pub fn success<T: Serialize>(status: StatusCode, data: T) -> EnvelopeResponse<T> {
    (status, Json(Envelope::success(data)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_shape() {
        let value = serde_json::to_value(Envelope::success(json!({"id": 1}))).unwrap();
        assert_eq!(value, json!({"_tag": "success", "data": {"id": 1}}));
    }

    #[test]
    fn test_failure_shape_has_no_data_key() {
        let value = serde_json::to_value(Envelope::<()>::failure("nope")).unwrap();
        assert_eq!(value, json!({"_tag": "failure", "error": "nope"}));
    }
}
