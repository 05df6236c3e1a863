//! Interactive driver: suspensions are answered synchronously.

use super::Harness;
use crate::context::FlowContext;
use crate::core::{
    Click, ClickRequest, ConfirmationChoice, ConfirmationRequest, DialogRequest, DialogValues,
    FrameRequest, Preload, StepResult, Suspension,
};
use crate::errors::HarnessError;
use crate::flow::FlowIdentity;
use tracing::debug;

/// Answers the requests of a suspended flow, e.g. by showing a dialog.
///
/// Returning `None` from `dialog`, `frame` or `click` cancels the flow.
#[cfg_attr(test, mockall::automock)]
pub trait InteractionListener {
    /// Shows a dialog and returns the submitted values.
    fn dialog(&mut self, request: &DialogRequest) -> Option<DialogValues>;

    /// Shows an embedded frame and returns its submitted values.
    fn frame(&mut self, request: &FrameRequest) -> Option<DialogValues>;

    /// Asks for a confirmation.
    fn confirm(&mut self, request: &ConfirmationRequest) -> ConfirmationChoice;

    /// Waits for a click on the canvas.
    fn click(&mut self, request: &ClickRequest) -> Option<Click>;
}

/// Runs flows to completion, blocking on a listener at each suspension.
#[derive(Debug)]
pub struct InteractiveDriver<L> {
    harness: Harness,
    listener: L,
}

impl<L: InteractionListener> InteractiveDriver<L> {
    /// Creates a driver with a fresh harness.
    #[must_use]
    pub fn new(listener: L) -> Self {
        Self {
            harness: Harness::new(),
            listener,
        }
    }

    /// Replaces the harness.
    #[must_use]
    pub fn with_harness(mut self, harness: Harness) -> Self {
        self.harness = harness;
        self
    }

    /// The harness.
    #[must_use]
    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    /// The listener.
    #[must_use]
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Consumes the driver, returning the listener.
    pub fn into_listener(self) -> L {
        self.listener
    }

    /// Runs a flow until it reaches a terminal outcome.
    pub fn run(
        &mut self,
        identity: FlowIdentity,
        preload: Preload,
        ctx: &mut FlowContext,
    ) -> Result<StepResult, HarnessError> {
        let mut result = self.harness.start(identity, preload, ctx);

        while let Some(suspension) = result.suspension().cloned() {
            debug!(outcome = %result.outcome(), "Asking listener");
            result = match suspension {
                Suspension::Dialog(request) => match self.listener.dialog(&request) {
                    Some(values) => self.harness.submit_dialog(values, ctx)?,
                    None => self.harness.cancel_dialog()?,
                },
                Suspension::Frame(request) => match self.listener.frame(&request) {
                    Some(values) => self.harness.submit_dialog(values, ctx)?,
                    None => self.harness.cancel_dialog()?,
                },
                Suspension::Confirmation(request) => {
                    let choice = self.listener.confirm(&request);
                    self.harness.submit_confirmation(choice, ctx)?
                }
                Suspension::Click(request) => match self.listener.click(&request) {
                    Some(click) => self.harness.submit_click(click, ctx)?,
                    None => self.harness.cancel()?,
                },
            };
        }

        Ok(result)
    }
}
