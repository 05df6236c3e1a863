//! Builtin flows.
//!
//! Each flow is a unit struct implementing [`Flow`](crate::flow::Flow). Flows
//! that suspend define a resume-point enum; single-step flows use `()`.
//! Business effects are deliberately small: they exist to exercise every
//! suspension kind and every preload class.

mod editing;
mod models;
mod selection;
mod view;

pub use editing::{AddLink, AddLinkStep, AddNode, AddNodeStep, RenameNode, RenameNodeStep};
pub use models::{DeleteModel, DeleteModelStep, OpenModel};
pub use selection::{MoveNodes, SelectMany, SelectNode};
pub use view::{ExportImage, ExportImageStep, SetTime};

use crate::context::FlowContext;
use crate::core::{
    Click, ConfirmationChoice, DialogValues, Interaction, StepState,
};
use crate::errors::FlowError;
use serde::de::DeserializeOwned;

/// Takes a dialog answer out of a resumed state.
pub(crate) fn take_dialog<R>(state: StepState<R>) -> Result<(DialogValues, StepState<R>), FlowError> {
    match state.take_input() {
        (Some(Interaction::Dialog { values }), state) => Ok((values, state)),
        _ => Err(FlowError::UnexpectedInput { expected: "dialog" }),
    }
}

/// Takes a confirmation answer out of a resumed state.
pub(crate) fn take_confirmation<R>(
    state: StepState<R>,
) -> Result<(ConfirmationChoice, StepState<R>), FlowError> {
    match state.take_input() {
        (Some(Interaction::Confirmation { choice }), state) => Ok((choice, state)),
        _ => Err(FlowError::UnexpectedInput {
            expected: "confirmation",
        }),
    }
}

/// Takes a click answer out of a resumed state.
pub(crate) fn take_click<R>(state: StepState<R>) -> Result<(Click, StepState<R>), FlowError> {
    match state.take_input() {
        (Some(Interaction::Click { click }), state) => Ok((click, state)),
        _ => Err(FlowError::UnexpectedInput { expected: "click" }),
    }
}

/// Reads a scratch value an earlier sub-step must have stored.
pub(crate) fn carried<T: DeserializeOwned, R>(state: &StepState<R>, key: &str) -> Result<T, FlowError> {
    state
        .get_as(key)
        .ok_or_else(|| FlowError::CorruptState(format!("missing carried value '{key}'")))
}

/// Scratch key holding the model a flow was started on.
pub(crate) const MODEL_ID: &str = "model_id";

/// Focuses the model given in the preload and pins it in scratch.
pub(crate) fn pin_model<R>(
    state: StepState<R>,
    ctx: &mut FlowContext,
) -> Result<(String, StepState<R>), FlowError> {
    let model_id = ctx.focus(state.preload().model_id())?;
    let state = state.with(MODEL_ID, model_id.clone());
    Ok((model_id, state))
}

/// Re-focuses the pinned model before a resumed sub-step acts on it.
///
/// The context is shared, so another session may have switched the current
/// model while this flow was suspended.
pub(crate) fn refocus<R>(state: &StepState<R>, ctx: &mut FlowContext) -> Result<String, FlowError> {
    let model_id: String = carried(state, MODEL_ID)?;
    ctx.focus(Some(&model_id))
}

/// Trimmed, non-empty dialog value.
pub(crate) fn dialog_text<'a>(values: &'a DialogValues, name: &str) -> Option<&'a str> {
    values.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FlowArgs, Preload};

    fn state() -> StepState<()> {
        StepState::new((), Preload::menu(), FlowArgs::new())
    }

    #[test]
    fn test_take_answer_checks_kind() {
        let answered = state().with_input(Interaction::confirmation(ConfirmationChoice::No));
        assert!(matches!(
            take_click(answered.clone()),
            Err(FlowError::UnexpectedInput { expected: "click" })
        ));
        let (choice, rest) = take_confirmation(answered).unwrap();
        assert_eq!(choice, ConfirmationChoice::No);
        assert!(rest.input().is_none());
    }

    #[test]
    fn test_carried_reports_missing_value() {
        let err = carried::<String, _>(&state(), "from").unwrap_err();
        assert!(matches!(err, FlowError::CorruptState(_)));
        assert_eq!(carried::<String, _>(&state().with("from", "n1"), "from").unwrap(), "n1");
    }

    #[test]
    fn test_refocus_returns_to_pinned_model() {
        let mut ctx = crate::testing::TestWorkspace::new().build();
        let (pinned, state) = pin_model(state(), &mut ctx).unwrap();
        assert_eq!(pinned, ctx.root_id());
        ctx.focus(Some("sub")).unwrap();
        assert_eq!(refocus(&state, &mut ctx).unwrap(), pinned);
        assert_eq!(ctx.current_model_id(), pinned);
    }

    #[test]
    fn test_dialog_text_trims() {
        let mut values = DialogValues::new();
        values.insert("label".to_string(), "  Pump ".to_string());
        values.insert("blank".to_string(), "   ".to_string());
        assert_eq!(dialog_text(&values, "label"), Some("Pump"));
        assert_eq!(dialog_text(&values, "blank"), None);
        assert_eq!(dialog_text(&values, "missing"), None);
    }
}
