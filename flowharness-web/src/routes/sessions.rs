//! Session endpoints: create, dispatch, inspect, end.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    Form, Json,
};
use flowharness::adapter::{FlowResponse, RawRequest};
use flowharness::harness::SessionStatus;
use flowharness::session::SessionId;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of a created session
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedSession {
    /// The new session id.
    pub session_id: SessionId,
}

fn parse_id(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("'{raw}' is not a session id")))
}

/// Creates an idle session.
pub async fn create(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreatedSession>), ApiError> {
    let session_id = state.driver.create_session().await?;
    Ok((StatusCode::CREATED, Json(CreatedSession { session_id })))
}

/// Runs one form-encoded request against a session.
///
/// An unknown or expired session id starts from a fresh harness.
pub async fn dispatch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Form<RawRequest>, FormRejection>,
) -> Result<Json<FlowResponse>, ApiError> {
    let session = parse_id(&id)?;
    let Form(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let response = state.driver.dispatch(&session, &request).await?;
    tracing::debug!(session = %session, kind = %response.kind, "Dispatched");
    Ok(Json(response))
}

/// The status of a session.
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatus>, ApiError> {
    let session = parse_id(&id)?;
    state
        .driver
        .status(&session)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Session '{session}' not found")))
}

/// Resets and drops a session.
pub async fn end(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session = parse_id(&id)?;
    if state.driver.end_session(&session).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Session '{session}' not found")))
    }
}
