//! Liveness probe for the Agora API. Answers 200 even when the SQLite store
//! is unreachable; the body says which.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// `agora-api` package version.
    pub version: &'static str,
    /// `SELECT 1` succeeded on the user store.
    pub db_healthy: bool,
}

impl HealthResponse {
    fn from_db_probe(db_healthy: bool) -> Self {
        let status = if db_healthy {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        };
        HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
        }
    }
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match agora_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "User store failed health check");
            false
        }
    };

    Json(HealthResponse::from_db_probe(db_healthy))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
