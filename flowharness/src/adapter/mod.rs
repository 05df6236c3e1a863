//! The protocol adapter between a stateless transport and a harness.
//!
//! Every inbound request goes through the same algorithm:
//! 1. resolve the flow identity from `command_class` / `command_key`
//! 2. parse the `arg.*` bundle
//! 3. (the caller loads or creates the session's harness)
//! 4. reset a harness busy with a different identity
//! 5. idle: parse the class-specific preload and start the flow
//! 6. awaiting: read the request as the answer to the pending interaction
//! 7. map the result to a [`ResponseKind`] plus a UI snapshot
//!
//! Parameter and protocol errors are answered here and never reach a flow.

mod request;
mod response;

pub use request::RawRequest;
pub use response::{FlowResponse, ResponseKind};

use crate::context::FlowContext;
use crate::core::{Preload, SessionState, StepResult};
use crate::errors::{HarnessError, ProtocolError};
use crate::flow::FlowIdentity;
use crate::harness::Harness;
use tracing::{debug, warn};

/// Maps raw requests onto harness calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolAdapter;

impl ProtocolAdapter {
    /// Handles one request against a session's harness.
    pub fn dispatch(
        request: &RawRequest,
        harness: &mut Harness,
        ctx: &mut FlowContext,
    ) -> FlowResponse {
        let identity = match request.identity() {
            Ok(identity) => identity,
            Err(err) => {
                warn!(error = %err, "Rejected request");
                return FlowResponse::from_error(None, &HarnessError::from(err), harness, ctx);
            }
        };
        let command = identity.key();

        if harness.state() != SessionState::Idle && harness.current_flow() != Some(&identity) {
            debug!(flow = %command, "Request names another flow; discarding the pending one");
            harness.reset();
        }

        let handled = if harness.state().is_awaiting() {
            Self::answer(request, harness, ctx)
        } else {
            Self::start(request, identity, harness, ctx)
        };

        match handled {
            Ok(result) => FlowResponse::from_result(command, &result, harness, ctx),
            Err(err) => {
                warn!(flow = %command, error = %err, "Rejected request");
                FlowResponse::from_error(Some(command), &err, harness, ctx)
            }
        }
    }

    fn start(
        request: &RawRequest,
        identity: FlowIdentity,
        harness: &mut Harness,
        ctx: &mut FlowContext,
    ) -> Result<StepResult, HarnessError> {
        let preload = Preload::parse(identity.class(), request)?;
        Ok(harness.start(identity, preload, ctx))
    }

    fn answer(
        request: &RawRequest,
        harness: &mut Harness,
        ctx: &mut FlowContext,
    ) -> Result<StepResult, HarnessError> {
        let seq = request.seq()?;
        harness.check_seq(seq)?;

        if request.is_cancel() {
            return Ok(harness.cancel()?);
        }

        let Some(expected) = harness.state().expects() else {
            return Err(ProtocolError::NoPendingInteraction {
                state: harness.state(),
            }
            .into());
        };
        let interaction = request.answer(expected)?;
        Ok(harness.resume(interaction, seq, ctx)?)
    }
}
