//! The harness: owner of the one flow in flight and its pending result.
//!
//! A [`Harness`] is a small state machine over [`SessionState`]:
//!
//! ```text
//! Idle --start--> Active --suspending--> Awaiting*
//!                   ^                       |
//!                   +------submit_*---------+
//! Active --terminal--> Idle      Awaiting* --cancel/reset--> Idle
//! ```
//!
//! Three drivers surface the awaiting states differently:
//! - [`InteractiveDriver`] answers them synchronously through a listener
//! - [`BatchDriver`] treats any suspension as a hard failure
//! - [`SessionDriver`] stores the harness between independent requests

mod batch;
mod interactive;
mod session;


pub use batch::BatchDriver;
pub use interactive::{InteractionListener, InteractiveDriver};
pub use session::{FlowLock, SessionDriver, SessionStatus};

#[cfg(test)]
pub use interactive::MockInteractionListener;

use crate::config::HarnessConfig;
use crate::context::FlowContext;
use crate::core::{
    Click, ConfirmationChoice, DialogValues, Interaction, InteractionKind, Outcome, Preload,
    SessionState, StepResult, Suspension,
};
use crate::errors::ProtocolError;
use crate::events::{get_event_sink, types, EventSink};
use crate::flow::{FlowIdentity, StepInput, DEFAULT_MAX_STEPS};
use crate::registry::FlowRegistry;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The state machine owning at most one flow in flight.
///
/// A harness is plain data and serialises completely, except for its event
/// sink, which is re-attached from the global sink on deserialisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Harness {
    state: SessionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity: Option<FlowIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pending: Option<StepResult>,
    #[serde(default)]
    interaction_seq: u64,
    #[serde(default = "default_max_steps")]
    max_steps: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    run_id: Option<Uuid>,
    #[serde(skip, default = "get_event_sink")]
    sink: Arc<dyn EventSink>,
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            identity: None,
            pending: None,
            interaction_seq: 0,
            max_steps: DEFAULT_MAX_STEPS,
            run_id: None,
            sink: get_event_sink(),
        }
    }
}

impl Harness {
    /// Creates an idle harness.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an idle harness using the configured step bound.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new().with_max_steps(config.max_steps)
    }

    /// Sets the step bound.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The identity of the flow in flight.
    #[must_use]
    pub fn current_flow(&self) -> Option<&FlowIdentity> {
        self.identity.as_ref()
    }

    /// The suspended result waiting for an answer.
    #[must_use]
    pub fn pending(&self) -> Option<&StepResult> {
        self.pending.as_ref()
    }

    /// Sequence number of the latest suspension.
    #[must_use]
    pub fn interaction_seq(&self) -> u64 {
        self.interaction_seq
    }

    /// The step bound.
    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Id of the current flow run.
    #[must_use]
    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    /// Opaque token correlating answers with the pending interaction.
    ///
    /// Derived from the flow fingerprint and the interaction sequence, so it
    /// changes with every suspension. `None` unless awaiting.
    #[must_use]
    pub fn interaction_token(&self) -> Option<String> {
        if !self.state.is_awaiting() {
            return None;
        }
        let identity = self.identity.as_ref()?;
        let mut hasher = Sha256::new();
        hasher.update(identity.fingerprint().as_bytes());
        hasher.update(b"#");
        hasher.update(self.interaction_seq.to_be_bytes());
        Some(hex::encode(hasher.finalize()))
    }

    /// Starts a flow, discarding whatever was in flight.
    ///
    /// A disabled flow fails without stepping and leaves the harness idle.
    pub fn start(
        &mut self,
        identity: FlowIdentity,
        preload: Preload,
        ctx: &mut FlowContext,
    ) -> StepResult {
        if self.state != SessionState::Idle {
            self.reset();
        }

        let flow = FlowRegistry::build(&identity);
        if !flow.enabled(&ctx.predicates()) {
            warn!(flow = %identity.kind(), "Rejected start of disabled flow");
            let result = StepResult::failed(format!("Command '{}' is not enabled", identity.key()));
            self.emit(types::FLOW_FAILED, &identity, json!({"error": result.error()}));
            return result;
        }

        let run_id = Uuid::new_v4();
        info!(flow = %identity.kind(), %run_id, "Starting flow");
        self.emit(types::FLOW_STARTED, &identity, json!({"run_id": run_id}));

        let input = StepInput::Start {
            preload,
            args: identity.args().clone(),
        };
        self.run_id = Some(run_id);
        self.identity = Some(identity);
        self.state = SessionState::Active;

        let result = flow.step(ctx, input, self.max_steps);
        self.settle(result)
    }

    /// Checks an answer's sequence number against the pending interaction.
    ///
    /// Answers without a sequence number are accepted.
    pub fn check_seq(&self, seq: Option<u64>) -> Result<(), ProtocolError> {
        match seq {
            Some(received) if received != self.interaction_seq => {
                Err(ProtocolError::StaleInteraction {
                    expected: self.interaction_seq,
                    received,
                })
            }
            _ => Ok(()),
        }
    }

    /// Checks a confirmation answer against the buttons the prompt offered.
    fn check_offered(&self, interaction: &Interaction) -> Result<(), ProtocolError> {
        let Interaction::Confirmation { choice } = interaction else {
            return Ok(());
        };
        match self.pending.as_ref().and_then(StepResult::suspension) {
            Some(Suspension::Confirmation(prompt)) if !prompt.buttons.offers(*choice) => {
                Err(ProtocolError::UnofferedChoice { choice: *choice })
            }
            _ => Ok(()),
        }
    }

    /// Resumes the pending flow with an answer.
    ///
    /// Rejected answers leave the harness untouched.
    pub fn resume(
        &mut self,
        interaction: Interaction,
        seq: Option<u64>,
        ctx: &mut FlowContext,
    ) -> Result<StepResult, ProtocolError> {
        let expected = self.expects()?;
        if interaction.kind() != expected {
            return Err(ProtocolError::UnexpectedInteraction {
                expected,
                received: interaction.kind(),
            });
        }
        self.check_seq(seq)?;
        self.check_offered(&interaction)?;

        let (Some(identity), Some(pending)) = (self.identity.clone(), self.pending.take()) else {
            return Err(ProtocolError::NoPendingInteraction { state: self.state });
        };

        debug!(flow = %identity.kind(), seq = self.interaction_seq, answer = %expected, "Resuming flow");
        self.emit(types::FLOW_RESUMED, &identity, json!({"answer": expected}));
        self.state = SessionState::Active;

        let flow = FlowRegistry::build(&identity);
        let input = StepInput::Resume(pending.with_input(interaction));
        let result = flow.step(ctx, input, self.max_steps);
        Ok(self.settle(result))
    }

    /// Submits dialog or frame values.
    pub fn submit_dialog(
        &mut self,
        values: DialogValues,
        ctx: &mut FlowContext,
    ) -> Result<StepResult, ProtocolError> {
        self.resume(Interaction::dialog(values), None, ctx)
    }

    /// Submits a confirmation choice.
    pub fn submit_confirmation(
        &mut self,
        choice: ConfirmationChoice,
        ctx: &mut FlowContext,
    ) -> Result<StepResult, ProtocolError> {
        self.resume(Interaction::confirmation(choice), None, ctx)
    }

    /// Submits a click.
    pub fn submit_click(
        &mut self,
        click: Click,
        ctx: &mut FlowContext,
    ) -> Result<StepResult, ProtocolError> {
        self.resume(Interaction::click(click), None, ctx)
    }

    /// Dismisses a pending dialog or frame, ending the flow.
    pub fn cancel_dialog(&mut self) -> Result<StepResult, ProtocolError> {
        let expected = self.expects()?;
        if expected != InteractionKind::Dialog {
            return Err(ProtocolError::UnexpectedInteraction {
                expected,
                received: InteractionKind::Dialog,
            });
        }
        self.cancel()
    }

    /// Ends the pending flow without running further steps.
    pub fn cancel(&mut self) -> Result<StepResult, ProtocolError> {
        self.expects()?;
        let result = StepResult::cancelled(None);
        Ok(self.settle(result))
    }

    /// Discards any flow in flight and returns to `Idle`.
    pub fn reset(&mut self) {
        if let Some(identity) = self.identity.take() {
            info!(flow = %identity.kind(), state = %self.state, "Resetting harness");
            self.emit(types::FLOW_RESET, &identity, json!({"state": self.state}));
        }
        self.clear();
    }

    fn expects(&self) -> Result<InteractionKind, ProtocolError> {
        self.state
            .expects()
            .ok_or(ProtocolError::NoPendingInteraction { state: self.state })
    }

    /// Applies a step result: suspensions stash it, terminals clear state.
    fn settle(&mut self, result: StepResult) -> StepResult {
        let Some(identity) = self.identity.clone() else {
            return result;
        };
        let outcome = result.outcome();

        if let Some(kind) = outcome.awaits() {
            self.interaction_seq += 1;
            self.state = SessionState::awaiting(kind);
            self.pending = Some(result.clone());
            debug!(flow = %identity.kind(), %outcome, seq = self.interaction_seq, "Flow suspended");
            self.emit(
                types::FLOW_SUSPENDED,
                &identity,
                json!({"outcome": outcome, "seq": self.interaction_seq}),
            );
            return result;
        }

        let event = match outcome {
            Outcome::Done => types::FLOW_COMPLETED,
            Outcome::Cancelled => types::FLOW_CANCELLED,
            _ => types::FLOW_FAILED,
        };
        info!(flow = %identity.kind(), %outcome, "Flow finished");
        self.emit(event, &identity, json!({"outcome": outcome, "error": result.error()}));
        self.clear();
        result
    }

    fn clear(&mut self) {
        self.state = SessionState::Idle;
        self.identity = None;
        self.pending = None;
        self.run_id = None;
    }

    fn emit(&self, event_type: &str, identity: &FlowIdentity, mut data: serde_json::Value) {
        if let Some(map) = data.as_object_mut() {
            map.insert("flow".to_string(), json!(identity.key()));
            if let Some(run_id) = self.run_id {
                map.insert("run_id".to_string(), json!(run_id));
            }
        }
        self.sink.try_emit(event_type, Some(data));
    }
}
