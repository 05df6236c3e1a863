//! API error types and responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flowharness::errors::SessionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors a handler can answer with.
///
/// Rejections of the flow protocol itself are not errors here: they travel
/// as a `200` [`FlowResponse`](flowharness::adapter::FlowResponse) so the
/// client always receives a snapshot.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No such session.
    #[error("{0}")]
    NotFound(String),
    /// The request could not be read.
    #[error("{0}")]
    BadRequest(String),
    /// The session store failed.
    #[error("{0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable kind.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_not_found_response() {
        let response = ApiError::NotFound("Session 'x' not found".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.error, "not_found");
        assert_eq!(json.message, "Session 'x' not found");
    }

    #[test]
    fn test_session_error_is_internal() {
        let err = ApiError::from(SessionError::Corrupt {
            session: "s".to_string(),
            reason: "eof".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
