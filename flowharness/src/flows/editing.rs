//! Flows that edit the current model's graph.

use super::{carried, dialog_text, pin_model, refocus, take_click, take_dialog};
use crate::context::{FlowContext, Predicates};
use crate::core::{
    Click, ClickRequest, DialogField, DialogRequest, Point, Preload, StepState, Suspension,
};
use crate::errors::FlowError;
use crate::flow::{Flow, FlowKind, Transition};
use serde::{Deserialize, Serialize};

const LABEL: &str = "label";

fn label_dialog(title: &str, current: Option<&str>) -> Suspension {
    let mut field = DialogField::text(LABEL, "Label").required();
    if let Some(current) = current {
        field = field.with_default(current);
    }
    Suspension::Dialog(DialogRequest::new(title).field(field))
}

/// Resume points of [`AddNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddNodeStep {
    /// Resolve the clicked point.
    Place,
    /// Wait for the label dialog.
    AwaitLabel,
    /// Insert the node.
    Create,
}

/// Adds a node where the canvas was clicked.
///
/// The label comes from the `label` argument when given, otherwise from a
/// dialog. A blank label re-opens the dialog.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddNode;

impl Flow for AddNode {
    type Resume = AddNodeStep;

    fn kind(&self) -> FlowKind {
        FlowKind::AddNode
    }

    fn enabled(&self, _predicates: &Predicates) -> bool {
        true
    }

    fn entry(&self) -> AddNodeStep {
        AddNodeStep::Place
    }

    fn advance(
        &self,
        state: StepState<AddNodeStep>,
        ctx: &mut FlowContext,
    ) -> Result<Transition<AddNodeStep>, FlowError> {
        match *state.resume() {
            AddNodeStep::Place => {
                let Preload::Point { point, space, .. } = *state.preload() else {
                    return Err(FlowError::WrongPreload { expected: "point" });
                };
                let (_, state) = pin_model(state, ctx)?;
                let at = ctx.layout().to_model(point, space);
                let state = state.with("at", serde_json::to_value(at)?);

                match state.args().get(LABEL).map(str::to_string) {
                    Some(label) => Ok(Transition::Continue(
                        state.with(LABEL, label).goto(AddNodeStep::Create),
                    )),
                    None => Ok(Transition::Suspend(
                        state.goto(AddNodeStep::AwaitLabel),
                        label_dialog("New node", None),
                    )),
                }
            }
            AddNodeStep::AwaitLabel => {
                let (values, state) = take_dialog(state)?;
                match dialog_text(&values, LABEL) {
                    Some(label) => Ok(Transition::Continue(
                        state.with(LABEL, label).goto(AddNodeStep::Create),
                    )),
                    None => Ok(Transition::Suspend(state, label_dialog("New node", None))),
                }
            }
            AddNodeStep::Create => {
                let at: Point = carried(&state, "at")?;
                let label: String = carried(&state, LABEL)?;
                refocus(&state, ctx)?;
                let id = ctx.current_model_mut()?.add_node(label, at);
                ctx.set_selection([id.as_str()]);
                Ok(Transition::done_with("node_id", id))
            }
        }
    }
}

/// Resume points of [`AddLink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddLinkStep {
    /// Ask for the first endpoint.
    Start,
    /// Wait for the first click.
    AwaitSource,
    /// Wait for the second click.
    AwaitTarget,
}

/// Links the nodes nearest to two clicked points.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddLink;

impl AddLink {
    fn nearest(ctx: &FlowContext, click: Click) -> Result<String, FlowError> {
        let point = ctx.layout().to_model(click.point, click.space);
        ctx.current_model()
            .nearest_node(&point)
            .map(|node| node.id.clone())
            .ok_or_else(|| FlowError::rejected("The model has no nodes to link"))
    }
}

impl Flow for AddLink {
    type Resume = AddLinkStep;

    fn kind(&self) -> FlowKind {
        FlowKind::AddLink
    }

    fn enabled(&self, predicates: &Predicates) -> bool {
        predicates.node_count >= 2
    }

    fn entry(&self) -> AddLinkStep {
        AddLinkStep::Start
    }

    fn advance(
        &self,
        state: StepState<AddLinkStep>,
        ctx: &mut FlowContext,
    ) -> Result<Transition<AddLinkStep>, FlowError> {
        match *state.resume() {
            AddLinkStep::Start => {
                let (_, state) = pin_model(state, ctx)?;
                Ok(Transition::Suspend(
                    state.goto(AddLinkStep::AwaitSource),
                    Suspension::Click(ClickRequest::new("Click the source node", "link_source", 1)),
                ))
            }
            AddLinkStep::AwaitSource => {
                let (click, state) = take_click(state)?;
                refocus(&state, ctx)?;
                let source = Self::nearest(ctx, click)?;
                Ok(Transition::Suspend(
                    state.with("source", source).goto(AddLinkStep::AwaitTarget),
                    Suspension::Click(ClickRequest::new("Click the target node", "link_target", 2)),
                ))
            }
            AddLinkStep::AwaitTarget => {
                let (click, state) = take_click(state)?;
                let source: String = carried(&state, "source")?;
                refocus(&state, ctx)?;
                let target = Self::nearest(ctx, click)?;
                let id = ctx.current_model_mut()?.add_link(&source, &target)?;
                Ok(Transition::done_with("link_id", id)
                    .and("source", source)
                    .and("target", target))
            }
        }
    }
}

/// Resume points of [`RenameNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameNodeStep {
    /// Look up the node and ask for a name.
    Start,
    /// Wait for the dialog.
    AwaitLabel,
}

/// Renames the clicked node.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameNode;

impl Flow for RenameNode {
    type Resume = RenameNodeStep;

    fn kind(&self) -> FlowKind {
        FlowKind::RenameNode
    }

    fn enabled(&self, predicates: &Predicates) -> bool {
        predicates.has_nodes()
    }

    fn entry(&self) -> RenameNodeStep {
        RenameNodeStep::Start
    }

    fn advance(
        &self,
        state: StepState<RenameNodeStep>,
        ctx: &mut FlowContext,
    ) -> Result<Transition<RenameNodeStep>, FlowError> {
        let Preload::Object { object_id, .. } = state.preload() else {
            return Err(FlowError::WrongPreload { expected: "object" });
        };
        let object_id = object_id.clone();

        match *state.resume() {
            RenameNodeStep::Start => {
                let (_, state) = pin_model(state, ctx)?;
                let current = ctx
                    .current_model()
                    .node(&object_id)
                    .map(|node| node.label.clone())
                    .ok_or_else(|| FlowError::not_found("node", object_id.as_str()))?;

                if let Some(label) = state.args().get(LABEL) {
                    ctx.current_model_mut()?.rename_node(&object_id, label)?;
                    return Ok(Transition::done_with("node_id", object_id).and(LABEL, label));
                }
                Ok(Transition::Suspend(
                    state.goto(RenameNodeStep::AwaitLabel),
                    label_dialog("Rename node", Some(&current)),
                ))
            }
            RenameNodeStep::AwaitLabel => {
                let (values, state) = take_dialog(state)?;
                let label = dialog_text(&values, LABEL)
                    .ok_or_else(|| FlowError::invalid("A node label cannot be empty"))?;
                refocus(&state, ctx)?;
                ctx.current_model_mut()?.rename_node(&object_id, label)?;
                Ok(Transition::done_with("node_id", object_id).and(LABEL, label))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Click, CoordSpace, DialogValues, FlowArgs, Interaction, Outcome, StepResult};
    use crate::flow::{StepFlow, StepInput, DEFAULT_MAX_STEPS};
    use crate::testing::{assert_done, assert_failed, assert_outcome, TestWorkspace};
    use pretty_assertions::assert_eq;

    fn start(flow: &dyn StepFlow, ctx: &mut FlowContext, preload: Preload, args: FlowArgs) -> StepResult {
        flow.step(ctx, StepInput::Start { preload, args }, DEFAULT_MAX_STEPS)
    }

    fn answer(flow: &dyn StepFlow, ctx: &mut FlowContext, prior: StepResult, input: Interaction) -> StepResult {
        flow.step(ctx, StepInput::Resume(prior.with_input(input)), DEFAULT_MAX_STEPS)
    }

    fn label(value: &str) -> Interaction {
        let mut values = DialogValues::new();
        values.insert(LABEL.to_string(), value.to_string());
        Interaction::dialog(values)
    }

    fn click_at(x: f64, y: f64) -> Preload {
        Preload::Point {
            model_id: None,
            point: Point::new(x, y),
            space: CoordSpace::Model,
        }
    }

    #[test]
    fn test_add_node_asks_for_label() {
        let mut ctx = TestWorkspace::new().build();
        let first = start(&AddNode, &mut ctx, click_at(50.0, 50.0), FlowArgs::new());
        assert_outcome(&first, Outcome::NeedsDialog);
        assert_eq!(ctx.current_model().node_count(), 3);

        let done = answer(&AddNode, &mut ctx, first, label("Pump"));
        assert_done(&done);
        let id = done.value("node_id").and_then(|v| v.as_str()).unwrap().to_string();
        let node = ctx.current_model().node(&id).unwrap();
        assert_eq!(node.label, "Pump");
        assert_eq!(node.position, Point::new(50.0, 50.0));
        assert!(ctx.selection().contains(&id));
    }

    #[test]
    fn test_add_node_blank_label_reopens_dialog() {
        let mut ctx = TestWorkspace::new().build();
        let first = start(&AddNode, &mut ctx, click_at(1.0, 2.0), FlowArgs::new());
        let again = answer(&AddNode, &mut ctx, first, label("   "));

        assert_outcome(&again, Outcome::NeedsDialog);
        assert_eq!(ctx.current_model().node_count(), 3);
        assert_done(&answer(&AddNode, &mut ctx, again, label("Valve")));
    }

    #[test]
    fn test_add_node_label_argument_skips_dialog() {
        let mut ctx = TestWorkspace::new().build();
        let args = FlowArgs::from_pairs([("label", "Tank")]).unwrap();
        let result = start(&AddNode, &mut ctx, click_at(1.0, 2.0), args);

        assert_done(&result);
        assert_eq!(ctx.current_model().node_count(), 4);
    }

    #[test]
    fn test_add_link_two_clicks() {
        let mut ctx = TestWorkspace::new().build();
        let first = start(&AddLink, &mut ctx, Preload::menu(), FlowArgs::new());
        assert_outcome(&first, Outcome::NeedsClick);
        assert!(matches!(
            first.suspension(),
            Some(Suspension::Click(ClickRequest { index: 1, .. }))
        ));

        let second = answer(&AddLink, &mut ctx, first, Interaction::click(Click::at(2.0, 1.0)));
        assert_outcome(&second, Outcome::NeedsClick);
        assert!(matches!(
            second.suspension(),
            Some(Suspension::Click(ClickRequest { index: 2, .. }))
        ));
        assert!(ctx.current_model().links().is_empty());

        let done = answer(&AddLink, &mut ctx, second, Interaction::click(Click::at(98.0, 3.0)));
        assert_done(&done);
        assert_eq!(done.value("source"), Some(&serde_json::json!("n1")));
        assert_eq!(done.value("target"), Some(&serde_json::json!("n2")));
        assert_eq!(ctx.current_model().links().len(), 1);
    }

    #[test]
    fn test_add_link_same_node_fails() {
        let mut ctx = TestWorkspace::new().build();
        let first = start(&AddLink, &mut ctx, Preload::menu(), FlowArgs::new());
        let second = answer(&AddLink, &mut ctx, first, Interaction::click(Click::at(0.0, 0.0)));
        let result = answer(&AddLink, &mut ctx, second, Interaction::click(Click::at(1.0, 1.0)));

        assert_failed(&result);
        assert!(ctx.current_model().links().is_empty());
    }

    #[test]
    fn test_add_link_needs_two_nodes() {
        let one = TestWorkspace::empty()
            .with_node("n1", "Only", Point::new(0.0, 0.0))
            .build()
            .predicates();
        assert!(!Flow::enabled(&AddLink, &one));
        assert!(Flow::enabled(&AddLink, &TestWorkspace::new().build().predicates()));
    }

    #[test]
    fn test_rename_node_dialog_defaults_to_current_label() {
        let mut ctx = TestWorkspace::new().build();
        let preload = Preload::Object {
            model_id: None,
            object_id: "n1".to_string(),
            sub_id: None,
        };
        let first = start(&RenameNode, &mut ctx, preload, FlowArgs::new());

        let Some(Suspension::Dialog(dialog)) = first.suspension() else {
            panic!("expected a dialog, got {:?}", first.outcome());
        };
        assert_eq!(dialog.fields[0].default.as_deref(), Some("Source"));

        assert_done(&answer(&RenameNode, &mut ctx, first, label("Inlet")));
        assert_eq!(ctx.current_model().node("n1").unwrap().label, "Inlet");
    }

    #[test]
    fn test_resumed_edits_stay_on_the_starting_model() {
        let mut ctx = TestWorkspace::new().build();
        let preload = Preload::Object {
            model_id: None,
            object_id: "n1".to_string(),
            sub_id: None,
        };
        let rename = start(&RenameNode, &mut ctx, preload, FlowArgs::new());
        let node = start(&AddNode, &mut ctx, click_at(5.0, 5.0), FlowArgs::new());
        let link = start(&AddLink, &mut ctx, Preload::menu(), FlowArgs::new());

        ctx.focus(Some("sub")).unwrap();
        assert_done(&answer(&RenameNode, &mut ctx, rename, label("Inlet")));
        ctx.focus(Some("sub")).unwrap();
        assert_done(&answer(&AddNode, &mut ctx, node, label("Pump")));
        ctx.focus(Some("sub")).unwrap();
        let link = answer(&AddLink, &mut ctx, link, Interaction::click(Click::at(0.0, 0.0)));
        ctx.focus(Some("sub")).unwrap();
        assert_done(&answer(&AddLink, &mut ctx, link, Interaction::click(Click::at(100.0, 0.0))));

        let root = ctx.model("root").unwrap();
        assert_eq!(root.node("n1").unwrap().label, "Inlet");
        assert_eq!(root.node_count(), 4);
        assert_eq!(root.links().len(), 1);
        let sub = ctx.model("sub").unwrap();
        assert_eq!(sub.node_count(), 1);
        assert!(sub.links().is_empty());
    }

    #[test]
    fn test_rename_node_rejects_blank_label() {
        let mut ctx = TestWorkspace::new().build();
        let preload = Preload::Object {
            model_id: None,
            object_id: "n1".to_string(),
            sub_id: None,
        };
        let first = start(&RenameNode, &mut ctx, preload, FlowArgs::new());
        let result = answer(&RenameNode, &mut ctx, first, label(""));

        assert_failed(&result);
        assert_eq!(ctx.current_model().node("n1").unwrap().label, "Source");
    }
}
