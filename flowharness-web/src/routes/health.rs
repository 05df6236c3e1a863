//! Health check endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Live sessions.
    pub sessions: usize,
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.driver.store().count().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowharness::config::HarnessConfig;

    #[tokio::test]
    async fn test_health() {
        let state = AppState::empty(HarnessConfig::default());
        state.driver.create_session().await.unwrap();

        let resp = health(State(state)).await;
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.sessions, 1);
    }
}
