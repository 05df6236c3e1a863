//! What a single sub-step decides.

use crate::core::{ResultValues, StepState, Suspension};

/// The result of one private sub-step of a flow.
///
/// Failures are not a variant: sub-steps return `Err(FlowError)` and the
/// step loop turns it into a `Failed` result.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<R> {
    /// Run the next sub-step right away.
    Continue(StepState<R>),
    /// Wait for external input, then resume from the given state.
    Suspend(StepState<R>, Suspension),
    /// The flow completed.
    Done(ResultValues),
    /// The user cancelled the flow.
    Cancelled(Option<String>),
}

impl<R> Transition<R> {
    /// Completion without values.
    #[must_use]
    pub fn done() -> Self {
        Self::Done(ResultValues::new())
    }

    /// Completion with a single value.
    #[must_use]
    pub fn done_with(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let mut values = ResultValues::new();
        values.insert(key.into(), value.into());
        Self::Done(values)
    }

    /// Cancellation with a reason.
    #[must_use]
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled(Some(reason.into()))
    }

    /// Adds a value to a `Done` transition; other transitions are unchanged.
    #[must_use]
    pub fn and(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        if let Self::Done(values) = &mut self {
            values.insert(key.into(), value.into());
        }
        self
    }
}
