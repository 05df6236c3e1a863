//! Command enumeration.

use axum::{extract::State, Json};
use flowharness::registry::CommandInfo;

use crate::state::AppState;

/// Every command with its enabled state against the current context.
pub async fn list(State(state): State<AppState>) -> Json<Vec<CommandInfo>> {
    Json(state.driver.commands().await)
}
