//! Outbound responses: one tagged outcome plus a UI snapshot.

use crate::context::{FlowContext, UiSnapshot};
use crate::core::{Outcome, Payload, SessionState, StepResult};
use crate::errors::{ErrorInfo, HarnessError};
use crate::harness::Harness;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The external response kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// The flow completed.
    Success,
    /// The flow was cancelled.
    Cancelled,
    /// The request was malformed; no flow ran.
    ParameterError,
    /// The flow failed.
    ProcessingError,
    /// The answer did not match the pending interaction.
    ProtocolError,
    /// A dialog must be shown.
    NeedsDialog,
    /// A confirmation must be asked.
    NeedsConfirmation,
    /// A canvas click is awaited.
    WaitingForClick,
    /// An embedded frame must be shown.
    NeedsFrame,
}

impl ResponseKind {
    /// The response kind for a step outcome.
    #[must_use]
    pub fn from_outcome(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => Self::Success,
            Outcome::Cancelled => Self::Cancelled,
            Outcome::Failed | Outcome::Continue => Self::ProcessingError,
            Outcome::NeedsDialog => Self::NeedsDialog,
            Outcome::NeedsConfirmation => Self::NeedsConfirmation,
            Outcome::NeedsClick => Self::WaitingForClick,
            Outcome::NeedsFrame => Self::NeedsFrame,
        }
    }

    /// Returns true for the two rejection kinds that leave no flow trace.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::ParameterError | Self::ProtocolError)
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Cancelled => "cancelled",
            Self::ParameterError => "parameter_error",
            Self::ProcessingError => "processing_error",
            Self::ProtocolError => "protocol_error",
            Self::NeedsDialog => "needs_dialog",
            Self::NeedsConfirmation => "needs_confirmation",
            Self::WaitingForClick => "waiting_for_click",
            Self::NeedsFrame => "needs_frame",
        };
        f.write_str(s)
    }
}

/// What the caller gets back from every dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowResponse {
    /// The response kind.
    pub kind: ResponseKind,
    /// Command key the request resolved to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Human-readable message for errors and cancellations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable error metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    /// Request, values or error message of the step result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    /// Harness state after the call.
    pub state: SessionState,
    /// Sequence number to echo with the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    /// Token of the pending interaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Current UI state.
    pub snapshot: UiSnapshot,
}

impl FlowResponse {
    /// Builds the response to a step result.
    #[must_use]
    pub fn from_result(
        command: &str,
        result: &StepResult,
        harness: &Harness,
        ctx: &FlowContext,
    ) -> Self {
        let message = match result.outcome() {
            Outcome::Failed => result.error().map(String::from),
            Outcome::Cancelled => result
                .value("reason")
                .and_then(|v| v.as_str())
                .map(String::from),
            _ => None,
        };
        Self {
            kind: ResponseKind::from_outcome(result.outcome()),
            command: Some(command.to_string()),
            message,
            error: None,
            payload: result.payload().cloned(),
            ..Self::base(harness, ctx)
        }
    }

    /// Builds the response to a rejected request.
    ///
    /// A harness still awaiting an answer re-sends its pending request so
    /// the caller can resynchronise.
    #[must_use]
    pub fn from_error(
        command: Option<&str>,
        err: &HarnessError,
        harness: &Harness,
        ctx: &FlowContext,
    ) -> Self {
        let (kind, error) = match err {
            HarnessError::Parameter(e) => (ResponseKind::ParameterError, Some(e.info())),
            HarnessError::Protocol(e) => (ResponseKind::ProtocolError, Some(e.info())),
            _ => (ResponseKind::ProcessingError, None),
        };
        Self {
            kind,
            command: command.map(String::from),
            message: Some(err.to_string()),
            error,
            payload: harness.pending().and_then(StepResult::payload).cloned(),
            ..Self::base(harness, ctx)
        }
    }

    fn base(harness: &Harness, ctx: &FlowContext) -> Self {
        let awaiting = harness.state().is_awaiting();
        Self {
            kind: ResponseKind::Success,
            command: None,
            message: None,
            error: None,
            payload: None,
            state: harness.state(),
            seq: awaiting.then_some(harness.interaction_seq()),
            token: harness.interaction_token(),
            snapshot: UiSnapshot::capture(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ParameterError;
    use crate::testing::TestWorkspace;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ResponseKind::from_outcome(Outcome::NeedsClick), ResponseKind::WaitingForClick);
        assert_eq!(ResponseKind::from_outcome(Outcome::Failed), ResponseKind::ProcessingError);
        assert_eq!(ResponseKind::WaitingForClick.to_string(), "waiting_for_click");
        assert_eq!(
            serde_json::to_value(ResponseKind::NeedsFrame).unwrap(),
            serde_json::json!("needs_frame")
        );
    }

    #[test]
    fn test_error_response_carries_snapshot() {
        let ctx = TestWorkspace::new().build();
        let err = HarnessError::from(ParameterError::missing("x"));

        let response = FlowResponse::from_error(Some("add_node"), &err, &Harness::new(), &ctx);

        assert_eq!(response.kind, ResponseKind::ParameterError);
        assert_eq!(response.error.unwrap().code, "PARAM-MISSING-FIELD");
        assert_eq!(response.snapshot.current_model_id, "root");
        assert!(response.seq.is_none());
        assert!(response.kind.is_rejection());
    }

    #[test]
    fn test_failed_result_message() {
        let ctx = TestWorkspace::new().build();
        let response =
            FlowResponse::from_result("select_node", &StepResult::failed("No node"), &Harness::new(), &ctx);
        assert_eq!(response.kind, ResponseKind::ProcessingError);
        assert_eq!(response.message.as_deref(), Some("No node"));
    }
}
