//! View flows: time slider and image export.

use super::{carried, dialog_text, pin_model, refocus, take_dialog};
use crate::context::{ExportRecord, FlowContext, Predicates};
use crate::core::{FrameRequest, Preload, StepState, Suspension};
use crate::errors::FlowError;
use crate::flow::{Flow, FlowKind, Transition};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Moves the time slider.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetTime;

impl Flow for SetTime {
    type Resume = ();

    fn kind(&self) -> FlowKind {
        FlowKind::SetTime
    }

    fn enabled(&self, _predicates: &Predicates) -> bool {
        true
    }

    fn entry(&self) {}

    fn advance(&self, state: StepState<()>, ctx: &mut FlowContext) -> Result<Transition<()>, FlowError> {
        let Preload::Time { value } = state.preload() else {
            return Err(FlowError::WrongPreload { expected: "time" });
        };
        if *value < 0.0 {
            return Err(FlowError::invalid(format!("Time {value} is negative")));
        }
        ctx.set_time(*value);
        Ok(Transition::done_with("time", *value))
    }
}

const FORMATS: [&str; 3] = ["png", "svg", "pdf"];
const DEFAULT_FORMAT: &str = "png";

/// Resume points of [`ExportImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportImageStep {
    /// Open the export frame unless arguments already say what to export.
    Start,
    /// Wait for the frame.
    AwaitFrame,
    /// Hand the request to the external tool.
    Export,
}

/// Exports the current model through the external rendering tool.
///
/// The `format` argument (optionally with `scale`) skips the export frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportImage;

impl ExportImage {
    fn options<R>(state: StepState<R>, format: Option<&str>, scale: Option<&str>) -> Result<StepState<R>, FlowError> {
        let format = format.unwrap_or(DEFAULT_FORMAT).to_ascii_lowercase();
        if !FORMATS.contains(&format.as_str()) {
            return Err(FlowError::invalid(format!(
                "Unsupported export format '{format}' (expected one of {})",
                FORMATS.join(", ")
            )));
        }
        let scale = match scale {
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|s| s.is_finite() && *s > 0.0)
                .ok_or_else(|| FlowError::invalid(format!("Invalid export scale '{raw}'")))?,
            None => 1.0,
        };
        Ok(state.with("format", format).with("scale", scale))
    }
}

impl Flow for ExportImage {
    type Resume = ExportImageStep;

    fn kind(&self) -> FlowKind {
        FlowKind::ExportImage
    }

    fn enabled(&self, predicates: &Predicates) -> bool {
        predicates.external_tool_connected
    }

    fn entry(&self) -> ExportImageStep {
        ExportImageStep::Start
    }

    fn advance(
        &self,
        state: StepState<ExportImageStep>,
        ctx: &mut FlowContext,
    ) -> Result<Transition<ExportImageStep>, FlowError> {
        match *state.resume() {
            ExportImageStep::Start => {
                let (model_id, state) = pin_model(state, ctx)?;
                if let Some(format) = state.args().get("format").map(str::to_string) {
                    let scale = state.args().get("scale").map(str::to_string);
                    let state = Self::options(state, Some(&format), scale.as_deref())?;
                    return Ok(Transition::Continue(state.goto(ExportImageStep::Export)));
                }

                let frame = FrameRequest::new("export_image", "Export image")
                    .parameter("model_id", model_id)
                    .parameter("format", DEFAULT_FORMAT)
                    .parameter("formats", FORMATS.join(","))
                    .parameter("scale", "1");
                Ok(Transition::Suspend(
                    state.goto(ExportImageStep::AwaitFrame),
                    Suspension::Frame(frame),
                ))
            }
            ExportImageStep::AwaitFrame => {
                let (values, state) = take_dialog(state)?;
                let state = Self::options(
                    state,
                    dialog_text(&values, "format"),
                    dialog_text(&values, "scale"),
                )?;
                Ok(Transition::Continue(state.goto(ExportImageStep::Export)))
            }
            ExportImageStep::Export => {
                if !ctx.external_tool_connected() {
                    return Err(FlowError::rejected("The external rendering tool is not connected"));
                }
                let format: String = carried(&state, "format")?;
                let scale: f64 = carried(&state, "scale")?;
                let model_id = refocus(&state, ctx)?;

                info!(model = %model_id, format = %format, scale, "Exporting image");
                ctx.record_export(ExportRecord {
                    model_id: model_id.clone(),
                    format: format.clone(),
                    scale,
                });
                Ok(Transition::done_with("model_id", model_id)
                    .and("format", format)
                    .and("scale", scale))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DialogValues, FlowArgs, Interaction, Outcome, StepResult};
    use crate::flow::{StepFlow, StepInput, DEFAULT_MAX_STEPS};
    use crate::testing::{assert_done, assert_failed, assert_outcome, TestWorkspace};
    use pretty_assertions::assert_eq;

    fn export(ctx: &mut FlowContext, args: FlowArgs) -> StepResult {
        let input = StepInput::Start {
            preload: Preload::menu(),
            args,
        };
        StepFlow::step(&ExportImage, ctx, input, DEFAULT_MAX_STEPS)
    }

    fn submit(ctx: &mut FlowContext, prior: StepResult, pairs: &[(&str, &str)]) -> StepResult {
        let values: DialogValues = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let input = StepInput::Resume(prior.with_input(Interaction::dialog(values)));
        StepFlow::step(&ExportImage, ctx, input, DEFAULT_MAX_STEPS)
    }

    #[test]
    fn test_set_time() {
        let mut ctx = TestWorkspace::new().build();
        let input = StepInput::Start {
            preload: Preload::Time { value: 12.5 },
            args: FlowArgs::new(),
        };
        assert_done(&StepFlow::step(&SetTime, &mut ctx, input, DEFAULT_MAX_STEPS));
        assert!((ctx.time() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_time_rejects_negative() {
        let mut ctx = TestWorkspace::new().build();
        let input = StepInput::Start {
            preload: Preload::Time { value: -1.0 },
            args: FlowArgs::new(),
        };
        assert_failed(&StepFlow::step(&SetTime, &mut ctx, input, DEFAULT_MAX_STEPS));
        assert!(ctx.time().abs() < f64::EPSILON);
    }

    #[test]
    fn test_export_frame_round() {
        let mut ctx = TestWorkspace::new().with_external_tool().build();
        let first = export(&mut ctx, FlowArgs::new());
        assert_outcome(&first, Outcome::NeedsFrame);
        let Some(Suspension::Frame(frame)) = first.suspension() else {
            panic!("expected a frame, got {:?}", first.outcome());
        };
        assert_eq!(frame.parameters.get("model_id").map(String::as_str), Some("root"));

        let result = submit(&mut ctx, first, &[("format", "SVG"), ("scale", "2")]);
        assert_done(&result);
        assert_eq!(
            ctx.exports(),
            &[ExportRecord {
                model_id: "root".to_string(),
                format: "svg".to_string(),
                scale: 2.0,
            }]
        );
    }

    #[test]
    fn test_export_format_argument_skips_frame() {
        let mut ctx = TestWorkspace::new().with_external_tool().build();
        let result = export(&mut ctx, FlowArgs::from_pairs([("format", "pdf")]).unwrap());
        assert_done(&result);
        assert_eq!(ctx.exports().len(), 1);
        assert_eq!(ctx.exports()[0].scale, 1.0);
    }

    #[test]
    fn test_export_keeps_the_model_shown_in_the_frame() {
        let mut ctx = TestWorkspace::new().with_external_tool().build();
        let first = export(&mut ctx, FlowArgs::new());
        ctx.focus(Some("sub")).unwrap();

        assert_done(&submit(&mut ctx, first, &[("format", "png")]));
        assert_eq!(ctx.exports()[0].model_id, "root");
    }

    #[test]
    fn test_export_rejects_unknown_format() {
        let mut ctx = TestWorkspace::new().with_external_tool().build();
        let first = export(&mut ctx, FlowArgs::new());
        let result = submit(&mut ctx, first, &[("format", "bmp")]);
        assert_failed(&result);
        assert!(ctx.exports().is_empty());
    }

    #[test]
    fn test_export_needs_external_tool() {
        let mut ctx = TestWorkspace::new().build();
        assert!(!Flow::enabled(&ExportImage, &ctx.predicates()));
        let result = export(&mut ctx, FlowArgs::from_pairs([("format", "png")]).unwrap());
        assert_failed(&result);
    }
}
