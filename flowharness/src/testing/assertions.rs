//! Test assertions for step results, harnesses and protocol responses.

use crate::adapter::{FlowResponse, ResponseKind};
use crate::core::{Outcome, SessionState, StepResult};
use crate::harness::Harness;

/// Asserts that the result has the expected outcome.
pub fn assert_outcome(result: &StepResult, expected: Outcome) {
    assert_eq!(
        result.outcome(),
        expected,
        "Expected outcome {expected}, got {} (payload: {:?})",
        result.outcome(),
        result.payload()
    );
}

/// Asserts that the result completed.
pub fn assert_done(result: &StepResult) {
    assert_outcome(result, Outcome::Done);
}

/// Asserts that the result was cancelled.
pub fn assert_cancelled(result: &StepResult) {
    assert_outcome(result, Outcome::Cancelled);
}

/// Asserts that the result failed.
pub fn assert_failed(result: &StepResult) {
    assert!(
        result.outcome() == Outcome::Failed && result.error().is_some(),
        "Expected a failure with a message, got {} (payload: {:?})",
        result.outcome(),
        result.payload()
    );
}

/// Asserts that the result carries a value.
pub fn assert_value(result: &StepResult, key: &str, expected: &serde_json::Value) {
    let actual = result.value(key);
    assert_eq!(
        actual,
        Some(expected),
        "Expected value {expected:?} for key '{key}', got {actual:?}"
    );
}

/// Asserts the harness state, and that a pending result exists exactly
/// when the harness is awaiting.
pub fn assert_state(harness: &Harness, expected: SessionState) {
    assert_eq!(
        harness.state(),
        expected,
        "Expected harness state {expected}, got {}",
        harness.state()
    );
    assert_eq!(
        harness.pending().is_some(),
        expected.is_awaiting(),
        "Pending result does not match state {expected}"
    );
}

/// Asserts the response kind of a protocol response.
pub fn assert_response(response: &FlowResponse, expected: ResponseKind) {
    assert_eq!(
        response.kind, expected,
        "Expected response {expected}, got {} (message: {:?})",
        response.kind, response.message
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResultValues;

    #[test]
    fn test_assert_done() {
        assert_done(&StepResult::done(ResultValues::new()));
    }

    #[test]
    #[should_panic(expected = "Expected outcome done")]
    fn test_assert_done_fails() {
        assert_done(&StepResult::failed("boom"));
    }

    #[test]
    fn test_assert_failed() {
        assert_failed(&StepResult::failed("boom"));
    }

    #[test]
    fn test_assert_value() {
        let mut values = ResultValues::new();
        values.insert("count".to_string(), serde_json::json!(42));
        assert_value(&StepResult::done(values), "count", &serde_json::json!(42));
    }

    #[test]
    fn test_assert_state_idle() {
        assert_state(&Harness::new(), SessionState::Idle);
    }
}
