//! Mock flows and listeners for testing.

use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::context::{FlowContext, Predicates};
use crate::core::{
    Click, ClickRequest, ConfirmationChoice, ConfirmationRequest, DialogRequest, DialogValues,
    FrameRequest, Interaction, StepState,
};
use crate::errors::FlowError;
use crate::flow::{Flow, FlowKind, Transition};
use crate::harness::InteractionListener;

/// A flow whose every step fails with a fixed message.
#[derive(Debug)]
pub struct FailingFlow {
    kind: FlowKind,
    message: String,
}

impl FailingFlow {
    /// Creates a failing flow.
    #[must_use]
    pub fn new(kind: FlowKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Flow for FailingFlow {
    type Resume = ();

    fn kind(&self) -> FlowKind {
        self.kind
    }

    fn enabled(&self, _predicates: &Predicates) -> bool {
        true
    }

    fn entry(&self) {}

    fn advance(&self, _state: StepState<()>, _ctx: &mut FlowContext) -> Result<Transition<()>, FlowError> {
        Err(FlowError::rejected(self.message.clone()))
    }
}

/// A flow that panics on its first step.
#[derive(Debug)]
pub struct PanickingFlow {
    kind: FlowKind,
}

impl PanickingFlow {
    /// Creates a panicking flow.
    #[must_use]
    pub fn new(kind: FlowKind) -> Self {
        Self { kind }
    }
}

impl Flow for PanickingFlow {
    type Resume = ();

    fn kind(&self) -> FlowKind {
        self.kind
    }

    fn enabled(&self, _predicates: &Predicates) -> bool {
        true
    }

    fn entry(&self) {}

    #[allow(clippy::panic)]
    fn advance(&self, _state: StepState<()>, _ctx: &mut FlowContext) -> Result<Transition<()>, FlowError> {
        panic!("{} exploded", self.kind)
    }
}

/// A flow that never settles: every sub-step continues.
#[derive(Debug)]
pub struct SpinningFlow {
    kind: FlowKind,
    steps: Mutex<usize>,
}

impl SpinningFlow {
    /// Creates a spinning flow.
    #[must_use]
    pub fn new(kind: FlowKind) -> Self {
        Self {
            kind,
            steps: Mutex::new(0),
        }
    }

    /// Number of sub-steps run so far.
    #[must_use]
    pub fn steps(&self) -> usize {
        *self.steps.lock()
    }
}

impl Flow for SpinningFlow {
    type Resume = u32;

    fn kind(&self) -> FlowKind {
        self.kind
    }

    fn enabled(&self, _predicates: &Predicates) -> bool {
        true
    }

    fn entry(&self) -> u32 {
        0
    }

    fn advance(&self, state: StepState<u32>, _ctx: &mut FlowContext) -> Result<Transition<u32>, FlowError> {
        *self.steps.lock() += 1;
        let next = state.resume() + 1;
        Ok(Transition::Continue(state.goto(next)))
    }
}

/// A listener answering suspensions from a fixed script.
///
/// Each callback takes the next scripted answer. A missing answer, or one
/// of the wrong kind, cancels.
#[derive(Debug, Default)]
pub struct ScriptedListener {
    answers: VecDeque<Option<Interaction>>,
    asked: Vec<String>,
}

impl ScriptedListener {
    /// Creates a listener with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues dialog or frame values.
    #[must_use]
    pub fn then_dialog<'a>(mut self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values: DialogValues = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.answers.push_back(Some(Interaction::dialog(values)));
        self
    }

    /// Queues a confirmation choice.
    #[must_use]
    pub fn then_confirm(mut self, choice: ConfirmationChoice) -> Self {
        self.answers.push_back(Some(Interaction::confirmation(choice)));
        self
    }

    /// Queues a click.
    #[must_use]
    pub fn then_click(mut self, x: f64, y: f64) -> Self {
        self.answers.push_back(Some(Interaction::click(Click::at(x, y))));
        self
    }

    /// Queues a cancel.
    #[must_use]
    pub fn then_cancel(mut self) -> Self {
        self.answers.push_back(None);
        self
    }

    /// Titles and prompts of the requests seen, in order.
    #[must_use]
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Number of scripted answers not consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Option<Interaction> {
        self.asked.push(prompt.to_string());
        self.answers.pop_front().flatten()
    }
}

impl InteractionListener for ScriptedListener {
    fn dialog(&mut self, request: &DialogRequest) -> Option<DialogValues> {
        match self.next(&request.title) {
            Some(Interaction::Dialog { values }) => Some(values),
            _ => None,
        }
    }

    fn frame(&mut self, request: &FrameRequest) -> Option<DialogValues> {
        match self.next(&request.title) {
            Some(Interaction::Dialog { values }) => Some(values),
            _ => None,
        }
    }

    fn confirm(&mut self, request: &ConfirmationRequest) -> ConfirmationChoice {
        match self.next(&request.title) {
            Some(Interaction::Confirmation { choice }) => choice,
            _ => ConfirmationChoice::Cancel,
        }
    }

    fn click(&mut self, request: &ClickRequest) -> Option<Click> {
        match self.next(&request.prompt) {
            Some(Interaction::Click { click }) => Some(click),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_listener_consumes_in_order() {
        let mut listener = ScriptedListener::new()
            .then_click(1.0, 2.0)
            .then_confirm(ConfirmationChoice::Yes);

        let click = listener.click(&ClickRequest::new("First", "test", 1));
        assert_eq!(click, Some(Click::at(1.0, 2.0)));
        let choice = listener.confirm(&ConfirmationRequest::yes_no("Sure", "Really?"));
        assert_eq!(choice, ConfirmationChoice::Yes);
        assert_eq!(listener.asked(), ["First".to_string(), "Sure".to_string()]);
        assert_eq!(listener.remaining(), 0);
    }

    #[test]
    fn test_scripted_listener_cancels_on_mismatch() {
        let mut listener = ScriptedListener::new().then_click(1.0, 2.0);
        assert!(listener.dialog(&DialogRequest::new("Name")).is_none());
        assert!(listener.click(&ClickRequest::new("Again", "test", 1)).is_none());
    }
}
