//! Flows that switch or remove models.

use super::{carried, pin_model, take_confirmation, MODEL_ID};
use crate::context::{FlowContext, Predicates};
use crate::core::{ConfirmationChoice, ConfirmationRequest, Preload, StepState, Suspension};
use crate::errors::FlowError;
use crate::flow::{Flow, FlowKind, Transition};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Resume points of [`DeleteModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteModelStep {
    /// Pick the target and ask for confirmation.
    Start,
    /// Wait for the answer.
    AwaitConfirmation,
    /// Remove the model.
    Delete,
}

/// Deletes the current (or named) model and its sub-models.
///
/// `confirm=yes` as an argument skips the confirmation prompt. Answering
/// `no` or `cancel` cancels the flow and leaves the model untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteModel;

impl Flow for DeleteModel {
    type Resume = DeleteModelStep;

    fn kind(&self) -> FlowKind {
        FlowKind::DeleteModel
    }

    fn enabled(&self, predicates: &Predicates) -> bool {
        !predicates.is_root_model
    }

    fn entry(&self) -> DeleteModelStep {
        DeleteModelStep::Start
    }

    fn advance(
        &self,
        state: StepState<DeleteModelStep>,
        ctx: &mut FlowContext,
    ) -> Result<Transition<DeleteModelStep>, FlowError> {
        match *state.resume() {
            DeleteModelStep::Start => {
                let (target, state) = pin_model(state, ctx)?;
                if target == ctx.root_id() {
                    return Err(FlowError::rejected("The root model cannot be deleted"));
                }
                let name = ctx
                    .model(&target)
                    .map_or_else(|| target.clone(), |model| model.name.clone());

                let preconfirmed = state
                    .args()
                    .get("confirm")
                    .and_then(|raw| raw.parse::<ConfirmationChoice>().ok())
                    == Some(ConfirmationChoice::Yes);
                if preconfirmed {
                    return Ok(Transition::Continue(state.goto(DeleteModelStep::Delete)));
                }

                Ok(Transition::Suspend(
                    state.goto(DeleteModelStep::AwaitConfirmation),
                    Suspension::Confirmation(ConfirmationRequest::yes_no_cancel(
                        "Delete model",
                        format!("Delete model '{name}' and all of its sub-models?"),
                    )),
                ))
            }
            DeleteModelStep::AwaitConfirmation => {
                let (choice, state) = take_confirmation(state)?;
                match choice {
                    ConfirmationChoice::Yes => {
                        Ok(Transition::Continue(state.goto(DeleteModelStep::Delete)))
                    }
                    ConfirmationChoice::No => Ok(Transition::cancelled("declined")),
                    ConfirmationChoice::Cancel => Ok(Transition::Cancelled(None)),
                }
            }
            DeleteModelStep::Delete => {
                let target: String = carried(&state, MODEL_ID)?;
                let removed = ctx.remove_model(&target)?;
                info!(model = %target, removed = removed.len(), "Deleted model");
                Ok(Transition::done_with("removed", removed)
                    .and("current_model_id", ctx.current_model_id()))
            }
        }
    }
}

/// Opens the model picked in the model tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenModel;

impl Flow for OpenModel {
    type Resume = ();

    fn kind(&self) -> FlowKind {
        FlowKind::OpenModel
    }

    fn enabled(&self, _predicates: &Predicates) -> bool {
        true
    }

    fn entry(&self) {}

    fn advance(&self, state: StepState<()>, ctx: &mut FlowContext) -> Result<Transition<()>, FlowError> {
        let Preload::TreeNode { node_id, node_type } = state.preload() else {
            return Err(FlowError::WrongPreload { expected: "tree_node" });
        };
        if node_type != "model" {
            return Err(FlowError::invalid(format!(
                "Tree node '{node_id}' is a {node_type}, not a model"
            )));
        }

        let current = ctx.focus(Some(node_id.as_str()))?;
        Ok(Transition::done_with("current_model_id", current))
    }
}
