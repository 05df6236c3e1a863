//! Selection flows. None of them suspend.

use crate::context::{FlowContext, Predicates};
use crate::core::{Preload, StepState};
use crate::errors::FlowError;
use crate::flow::{Flow, FlowKind, Transition};
use tracing::debug;

/// Selects the clicked node.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectNode;

impl Flow for SelectNode {
    type Resume = ();

    fn kind(&self) -> FlowKind {
        FlowKind::SelectNode
    }

    fn enabled(&self, predicates: &Predicates) -> bool {
        predicates.has_nodes()
    }

    fn entry(&self) {}

    fn advance(&self, state: StepState<()>, ctx: &mut FlowContext) -> Result<Transition<()>, FlowError> {
        let Preload::Object { object_id, .. } = state.preload() else {
            return Err(FlowError::WrongPreload { expected: "object" });
        };
        ctx.focus(state.preload().model_id())?;
        if !ctx.current_model().contains(object_id) {
            return Err(FlowError::not_found("node", object_id.as_str()));
        }

        ctx.set_selection([object_id.as_str()]);
        Ok(Transition::done_with("selected", object_id.as_str()))
    }
}

/// Replaces the selection with the listed ids that exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectMany;

impl Flow for SelectMany {
    type Resume = ();

    fn kind(&self) -> FlowKind {
        FlowKind::SelectMany
    }

    fn enabled(&self, predicates: &Predicates) -> bool {
        predicates.has_nodes()
    }

    fn entry(&self) {}

    fn advance(&self, state: StepState<()>, ctx: &mut FlowContext) -> Result<Transition<()>, FlowError> {
        let Preload::Selection { ids, .. } = state.preload() else {
            return Err(FlowError::WrongPreload { expected: "selection" });
        };
        ctx.focus(state.preload().model_id())?;

        let model = ctx.current_model();
        let (known, unknown): (Vec<&String>, Vec<&String>) =
            ids.iter().partition(|id| model.contains(id));
        if !unknown.is_empty() {
            debug!(ignored = ?unknown, "Ignoring unknown ids in selection");
        }

        let selected: Vec<String> = known.into_iter().cloned().collect();
        ctx.set_selection(selected.iter().cloned());
        Ok(Transition::done_with("selected", selected).and("ignored", unknown.len()))
    }
}

/// Moves the selected nodes by the drag vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveNodes;

impl Flow for MoveNodes {
    type Resume = ();

    fn kind(&self) -> FlowKind {
        FlowKind::MoveNodes
    }

    fn enabled(&self, predicates: &Predicates) -> bool {
        predicates.has_selection
    }

    fn entry(&self) {}

    fn advance(&self, state: StepState<()>, ctx: &mut FlowContext) -> Result<Transition<()>, FlowError> {
        let Preload::Drag { from, to, space, .. } = state.preload() else {
            return Err(FlowError::WrongPreload { expected: "drag" });
        };
        ctx.focus(state.preload().model_id())?;
        if ctx.selection().is_empty() {
            return Err(FlowError::rejected("Nothing is selected"));
        }

        let layout = *ctx.layout();
        let offset = layout.to_model(*to, *space).delta(&layout.to_model(*from, *space));
        let selection = ctx.selection().clone();
        let moved = ctx.current_model_mut()?.translate(&selection, &offset);
        Ok(Transition::done_with("moved", moved)
            .and("dx", offset.x)
            .and("dy", offset.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CoordSpace, FlowArgs, Outcome, Point, StepResult};
    use crate::context::Layout;
    use crate::flow::{StepFlow, StepInput, DEFAULT_MAX_STEPS};
    use crate::testing::{assert_done, assert_failed, TestWorkspace};
    use pretty_assertions::assert_eq;

    fn run(flow: &dyn StepFlow, ctx: &mut FlowContext, preload: Preload) -> StepResult {
        let input = StepInput::Start {
            preload,
            args: FlowArgs::new(),
        };
        flow.step(ctx, input, DEFAULT_MAX_STEPS)
    }

    fn object(id: &str) -> Preload {
        Preload::Object {
            model_id: None,
            object_id: id.to_string(),
            sub_id: None,
        }
    }

    #[test]
    fn test_select_node() {
        let mut ctx = TestWorkspace::new().build();
        let result = run(&SelectNode, &mut ctx, object("n2"));

        assert_done(&result);
        assert_eq!(result.value("selected"), Some(&serde_json::json!("n2")));
        assert!(ctx.selection().contains("n2"));
        assert_eq!(ctx.selection().len(), 1);
    }

    #[test]
    fn test_select_unknown_node_fails_without_mutation() {
        let mut ctx = TestWorkspace::new().with_selection(&["n1"]).build();
        let result = run(&SelectNode, &mut ctx, object("n99"));

        assert_failed(&result);
        assert!(result.error().unwrap().contains("n99"));
        assert!(ctx.selection().contains("n1"));
    }

    #[test]
    fn test_select_node_in_named_model() {
        let mut ctx = TestWorkspace::new().build();
        let preload = Preload::Object {
            model_id: Some("sub".to_string()),
            object_id: "c1".to_string(),
            sub_id: None,
        };
        assert_done(&run(&SelectNode, &mut ctx, preload));
        assert_eq!(ctx.current_model_id(), "sub");
    }

    #[test]
    fn test_select_node_rejects_wrong_preload() {
        let mut ctx = TestWorkspace::new().build();
        let result = run(&SelectNode, &mut ctx, Preload::menu());
        assert_eq!(result.outcome(), Outcome::Failed);
        assert_eq!(result.error(), Some("Preload 'object' required"));
    }

    #[test]
    fn test_select_many_keeps_known_ids() {
        let mut ctx = TestWorkspace::new().build();
        let preload = Preload::Selection {
            model_id: None,
            ids: vec!["n3".to_string(), "ghost".to_string(), "n1".to_string()],
        };
        let result = run(&SelectMany, &mut ctx, preload);

        assert_done(&result);
        assert_eq!(result.value("selected"), Some(&serde_json::json!(["n3", "n1"])));
        assert_eq!(result.value("ignored"), Some(&serde_json::json!(1)));
        assert_eq!(ctx.selection().len(), 2);
    }

    #[test]
    fn test_move_nodes_translates_selection() {
        let mut ctx = TestWorkspace::new().with_selection(&["n1", "n2"]).build();
        let preload = Preload::Drag {
            model_id: None,
            from: Point::new(10.0, 10.0),
            to: Point::new(15.0, 30.0),
            space: CoordSpace::Model,
        };
        let result = run(&MoveNodes, &mut ctx, preload);

        assert_done(&result);
        assert_eq!(result.value("moved"), Some(&serde_json::json!(2)));
        assert_eq!(ctx.current_model().node("n1").unwrap().position, Point::new(5.0, 20.0));
        assert_eq!(ctx.current_model().node("n2").unwrap().position, Point::new(105.0, 20.0));
        assert_eq!(ctx.current_model().node("n3").unwrap().position, Point::new(0.0, 100.0));
    }

    #[test]
    fn test_move_nodes_converts_device_space() {
        let mut ctx = TestWorkspace::new()
            .with_selection(&["n1"])
            .with_layout(Layout {
                origin: Point::new(0.0, 0.0),
                scale: 2.0,
            })
            .build();
        let preload = Preload::Drag {
            model_id: None,
            from: Point::new(0.0, 0.0),
            to: Point::new(20.0, 40.0),
            space: CoordSpace::Device,
        };
        assert_done(&run(&MoveNodes, &mut ctx, preload));
        assert_eq!(ctx.current_model().node("n1").unwrap().position, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_enablement_is_pure() {
        let predicates = TestWorkspace::new().build().predicates();
        for _ in 0..3 {
            assert!(Flow::enabled(&SelectNode, &predicates));
            assert!(!Flow::enabled(&MoveNodes, &predicates));
        }
        let empty = TestWorkspace::empty().build().predicates();
        assert!(!Flow::enabled(&SelectMany, &empty));
    }
}
