//! The envelope returned by every step call.

use super::{ErasedState, Interaction, Outcome, Payload, ResultValues, Suspension};
use serde::{Deserialize, Serialize};

/// An outcome, the state to resume with, and at most one payload.
///
/// Fields are private so the payload shape always matches the outcome:
/// suspending results carry a request and a state, `Done`/`Cancelled` carry
/// optional values and no state, `Failed` carries a message and no state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<ErasedState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Payload>,
}

impl StepResult {
    /// A completed result.
    #[must_use]
    pub fn done(values: ResultValues) -> Self {
        Self {
            outcome: Outcome::Done,
            state: None,
            payload: (!values.is_empty()).then_some(Payload::Values { values }),
        }
    }

    /// A cancelled result.
    #[must_use]
    pub fn cancelled(reason: Option<String>) -> Self {
        let payload = reason.map(|reason| {
            let mut values = ResultValues::new();
            values.insert("reason".to_string(), serde_json::Value::String(reason));
            Payload::Values { values }
        });
        Self {
            outcome: Outcome::Cancelled,
            state: None,
            payload,
        }
    }

    /// A failed result.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failed,
            state: None,
            payload: Some(Payload::Error {
                message: message.into(),
            }),
        }
    }

    /// A suspended result waiting for `suspension` to be answered.
    #[must_use]
    pub fn suspended(state: ErasedState, suspension: Suspension) -> Self {
        Self {
            outcome: suspension.outcome(),
            state: Some(state),
            payload: Some(Payload::Request { suspension }),
        }
    }

    /// The outcome.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The state to resume with (suspended results only).
    #[must_use]
    pub fn state(&self) -> Option<&ErasedState> {
        self.state.as_ref()
    }

    /// The payload.
    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// The request of a suspended result.
    #[must_use]
    pub fn suspension(&self) -> Option<&Suspension> {
        match &self.payload {
            Some(Payload::Request { suspension }) => Some(suspension),
            _ => None,
        }
    }

    /// The values of a terminal result.
    #[must_use]
    pub fn values(&self) -> Option<&ResultValues> {
        match &self.payload {
            Some(Payload::Values { values }) => Some(values),
            _ => None,
        }
    }

    /// Gets one result value.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&serde_json::Value> {
        self.values().and_then(|v| v.get(key))
    }

    /// The message of a failed result.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.payload {
            Some(Payload::Error { message }) => Some(message),
            _ => None,
        }
    }

    /// Returns true if the result ends the flow.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Returns true if the result waits for external input.
    #[must_use]
    pub fn is_suspending(&self) -> bool {
        self.outcome.is_suspending()
    }

    /// Merges an answer into the embedded state, ready to resume.
    ///
    /// Results without a state are returned unchanged.
    #[must_use]
    pub fn with_input(mut self, input: Interaction) -> Self {
        self.state = self.state.map(|state| state.with_input(input));
        self
    }

    /// Consumes the result, returning the embedded state.
    #[must_use]
    pub fn into_state(self) -> Option<ErasedState> {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        Click, ClickRequest, ConfirmationRequest, FlowArgs, Preload, StepState,
    };

    fn erased() -> ErasedState {
        StepState::new(serde_json::json!("await"), Preload::menu(), FlowArgs::new())
    }

    #[test]
    fn test_done_without_values_has_no_payload() {
        let result = StepResult::done(ResultValues::new());
        assert_eq!(result.outcome(), Outcome::Done);
        assert!(result.payload().is_none());
        assert!(result.state().is_none());
    }

    #[test]
    fn test_done_with_values() {
        let mut values = ResultValues::new();
        values.insert("node_id".to_string(), serde_json::json!("n4"));
        let result = StepResult::done(values);
        assert_eq!(result.value("node_id"), Some(&serde_json::json!("n4")));
        assert!(result.is_terminal());
    }

    #[test]
    fn test_cancelled_reason() {
        let result = StepResult::cancelled(Some("declined".to_string()));
        assert_eq!(result.value("reason"), Some(&serde_json::json!("declined")));
        assert!(StepResult::cancelled(None).payload().is_none());
    }

    #[test]
    fn test_failed_message() {
        let result = StepResult::failed("boom");
        assert_eq!(result.error(), Some("boom"));
        assert!(result.values().is_none());
    }

    #[test]
    fn test_suspended_outcome_follows_request() {
        let result = StepResult::suspended(
            erased(),
            Suspension::Confirmation(ConfirmationRequest::yes_no("Delete", "Sure?")),
        );
        assert_eq!(result.outcome(), Outcome::NeedsConfirmation);
        assert!(result.is_suspending());
        assert!(result.state().is_some());
        assert!(matches!(result.suspension(), Some(Suspension::Confirmation(_))));
    }

    #[test]
    fn test_with_input_injects_into_state() {
        let result = StepResult::suspended(
            erased(),
            Suspension::Click(ClickRequest::new("Click", "point", 1)),
        );
        let state = result
            .with_input(Interaction::click(Click::at(3.0, 4.0)))
            .into_state()
            .unwrap();
        assert_eq!(state.input(), Some(&Interaction::click(Click::at(3.0, 4.0))));

        assert!(StepResult::failed("x")
            .with_input(Interaction::click(Click::at(0.0, 0.0)))
            .into_state()
            .is_none());
    }
}
