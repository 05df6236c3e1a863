//! Flows: stateless operation logic advanced one step at a time.
//!
//! A [`Flow`] is written as a state machine over its own resume-point enum.
//! [`StepFlow`] is the erased view the harness drives; every `Flow` gets it
//! through a blanket impl whose step loop:
//! - runs sub-steps while they return [`Transition::Continue`],
//! - returns as soon as a terminal or suspending transition appears,
//! - converts sub-step errors and panics into a `Failed` result,
//! - fails a flow that keeps continuing past `max_steps`.
//!
//! The step loop is the only place sub-steps are re-entered.

mod identity;
mod transition;

pub use identity::{FlowIdentity, FlowKind};
pub use transition::Transition;

use crate::context::{FlowContext, Predicates};
use crate::core::{FlowArgs, Preload, StepResult, StepState};
use crate::errors::FlowError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Default bound on consecutive `Continue` transitions within one step call.
pub const DEFAULT_MAX_STEPS: usize = 64;

/// Operation logic, written as a typed state machine.
pub trait Flow: Send + Sync + fmt::Debug + 'static {
    /// The flow's resume points.
    type Resume: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync;

    /// Which flow this is.
    fn kind(&self) -> FlowKind;

    /// Whether the flow can be invoked. Must be pure.
    fn enabled(&self, predicates: &Predicates) -> bool;

    /// The resume point of a freshly preloaded state.
    fn entry(&self) -> Self::Resume;

    /// Runs the sub-step named by the state's resume point.
    fn advance(
        &self,
        state: StepState<Self::Resume>,
        ctx: &mut FlowContext,
    ) -> Result<Transition<Self::Resume>, FlowError>;
}

/// What a step call starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    /// First call: build a state from the preload.
    Start {
        /// Data from the triggering event.
        preload: Preload,
        /// Optional arguments of the flow identity.
        args: FlowArgs,
    },
    /// Later call: continue from the state embedded in the prior result.
    Resume(StepResult),
}

/// The erased flow interface the harness drives.
pub trait StepFlow: Send + Sync + fmt::Debug {
    /// Which flow this is.
    fn kind(&self) -> FlowKind;

    /// Whether the flow can be invoked. Pure and idempotent.
    fn enabled(&self, predicates: &Predicates) -> bool;

    /// Advances the flow until it completes, fails or suspends.
    ///
    /// Never panics and never returns `Outcome::Continue`.
    fn step(&self, ctx: &mut FlowContext, input: StepInput, max_steps: usize) -> StepResult;
}

impl<F: Flow> StepFlow for F {
    fn kind(&self) -> FlowKind {
        Flow::kind(self)
    }

    fn enabled(&self, predicates: &Predicates) -> bool {
        Flow::enabled(self, predicates)
    }

    fn step(&self, ctx: &mut FlowContext, input: StepInput, max_steps: usize) -> StepResult {
        let kind = Flow::kind(self);
        let state = match input {
            StepInput::Start { preload, args } => StepState::new(self.entry(), preload, args),
            StepInput::Resume(prior) => {
                let Some(erased) = prior.into_state() else {
                    return StepResult::failed(format!("Flow '{kind}' has no state to resume"));
                };
                match erased.restore::<F::Resume>() {
                    Ok(state) => state,
                    Err(err) => {
                        warn!(flow = %kind, error = %err, "Discarding undecodable step state");
                        return StepResult::failed(FlowError::from(err).to_string());
                    }
                }
            }
        };
        drive(self, state, ctx, max_steps)
    }
}

fn drive<F: Flow>(
    flow: &F,
    mut state: StepState<F::Resume>,
    ctx: &mut FlowContext,
    max_steps: usize,
) -> StepResult {
    let kind = Flow::kind(flow);

    for step in 0..max_steps {
        debug!(flow = %kind, step, resume = ?state.resume(), "Running sub-step");

        let advanced = panic::catch_unwind(AssertUnwindSafe(|| flow.advance(state, ctx)));
        match advanced {
            Ok(Ok(Transition::Continue(next))) => state = next,
            Ok(Ok(Transition::Suspend(next, suspension))) => {
                return match next.erase() {
                    Ok(erased) => StepResult::suspended(erased, suspension),
                    Err(err) => StepResult::failed(FlowError::from(err).to_string()),
                };
            }
            Ok(Ok(Transition::Done(values))) => return StepResult::done(values),
            Ok(Ok(Transition::Cancelled(reason))) => return StepResult::cancelled(reason),
            Ok(Err(err)) => {
                warn!(flow = %kind, error = %err, "Flow step failed");
                return StepResult::failed(err.to_string());
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(flow = %kind, panic = %message, "Flow step panicked");
                return StepResult::failed(format!("Flow '{kind}' panicked: {message}"));
            }
        }
    }

    warn!(flow = %kind, max_steps, "Flow did not settle");
    StepResult::failed(format!(
        "Flow '{kind}' did not settle within {max_steps} steps"
    ))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
