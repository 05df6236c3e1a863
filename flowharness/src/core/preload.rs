//! Preload variants: the data a triggering UI event hands to a flow before
//! its first step.
//!
//! Each [`FlowClass`] has its own required-parameter set. Parsing fails with
//! a [`ParameterError`] before any flow is started, so the harness never
//! steps with an incomplete [`StepState`](super::StepState).

use super::{CoordSpace, Point};
use crate::errors::ParameterError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Well-known request field names.
pub mod fields {
    /// Command class (trigger kind).
    pub const COMMAND_CLASS: &str = "command_class";
    /// Command key (which flow).
    pub const COMMAND_KEY: &str = "command_key";
    /// Prefix of optional flow arguments.
    pub const ARG_PREFIX: &str = "arg.";
    /// Prefix of submitted dialog values.
    pub const FIELD_PREFIX: &str = "field.";
    /// Model the command targets.
    pub const MODEL_ID: &str = "model_id";
    /// Clicked object.
    pub const OBJECT_ID: &str = "object_id";
    /// Sub-part of the clicked object.
    pub const SUB_ID: &str = "sub_id";
    /// First point, horizontal.
    pub const X: &str = "x";
    /// First point, vertical.
    pub const Y: &str = "y";
    /// Second point, horizontal.
    pub const X2: &str = "x2";
    /// Second point, vertical.
    pub const Y2: &str = "y2";
    /// Coordinate space of the points.
    pub const SPACE: &str = "space";
    /// Comma separated object ids.
    pub const IDS: &str = "ids";
    /// Tree node id.
    pub const TREE_NODE_ID: &str = "tree_node_id";
    /// Tree node type.
    pub const TREE_NODE_TYPE: &str = "tree_node_type";
    /// Time-slider value.
    pub const TIME: &str = "time";
    /// Confirmation answer.
    pub const CHOICE: &str = "choice";
    /// Cancel flag.
    pub const CANCEL: &str = "cancel";
    /// Interaction sequence number echoed by the client.
    pub const SEQ: &str = "seq";
    /// Shift modifier.
    pub const SHIFT: &str = "shift";
    /// Control modifier.
    pub const CTRL: &str = "ctrl";
    /// Alt modifier.
    pub const ALT: &str = "alt";
}

/// Source of raw string fields a preload is parsed from.
pub trait RawInput {
    /// Returns the trimmed value of a field, or `None` when absent or blank.
    fn field(&self, name: &str) -> Option<&str>;
}

impl RawInput for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }
}

impl RawInput for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }
}

/// The kind of UI event that triggers a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowClass {
    /// Menu or toolbar command.
    Menu,
    /// Popup menu on a model object.
    Popup,
    /// Click on the canvas.
    Click,
    /// Drag on the canvas.
    Drag,
    /// Multi-object selection.
    Selection,
    /// Selection in the model tree.
    Tree,
    /// Time-slider movement.
    Slider,
}

impl FlowClass {
    /// The wire name of the class.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Popup => "popup",
            Self::Click => "click",
            Self::Drag => "drag",
            Self::Selection => "selection",
            Self::Tree => "tree",
            Self::Slider => "slider",
        }
    }
}

impl fmt::Display for FlowClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowClass {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "menu" => Ok(Self::Menu),
            "popup" => Ok(Self::Popup),
            "click" => Ok(Self::Click),
            "drag" => Ok(Self::Drag),
            "selection" => Ok(Self::Selection),
            "tree" => Ok(Self::Tree),
            "slider" => Ok(Self::Slider),
            other => Err(ParameterError::invalid(
                fields::COMMAND_CLASS,
                format!("unknown command class '{other}'"),
            )),
        }
    }
}

/// Data supplied to a flow before its first step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Preload {
    /// Menu command: at most a target model.
    Menu {
        /// Target model.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model_id: Option<String>,
    },
    /// Popup on a model object.
    Object {
        /// Target model.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model_id: Option<String>,
        /// Clicked object.
        object_id: String,
        /// Clicked sub-part.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sub_id: Option<String>,
    },
    /// A single point.
    Point {
        /// Target model.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model_id: Option<String>,
        /// The point.
        point: Point,
        /// Space of the point.
        space: CoordSpace,
    },
    /// A drag between two points.
    Drag {
        /// Target model.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model_id: Option<String>,
        /// Drag start.
        from: Point,
        /// Drag end.
        to: Point,
        /// Space of both points.
        space: CoordSpace,
    },
    /// A multi-object selection.
    Selection {
        /// Target model.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model_id: Option<String>,
        /// Selected object ids, in request order, without duplicates.
        ids: Vec<String>,
    },
    /// A model-tree node.
    TreeNode {
        /// Node id.
        node_id: String,
        /// Node type (e.g. `model`).
        node_type: String,
    },
    /// A time-slider value.
    Time {
        /// Slider value.
        value: f64,
    },
}

impl Preload {
    /// Parses the preload required by `class` from raw request fields.
    pub fn parse(class: FlowClass, input: &impl RawInput) -> Result<Self, ParameterError> {
        let model_id = input.field(fields::MODEL_ID).map(String::from);

        match class {
            FlowClass::Menu => Ok(Self::Menu { model_id }),
            FlowClass::Popup => Ok(Self::Object {
                model_id,
                object_id: required(input, fields::OBJECT_ID)?.to_string(),
                sub_id: input.field(fields::SUB_ID).map(String::from),
            }),
            FlowClass::Click => Ok(Self::Point {
                model_id,
                point: point(input, fields::X, fields::Y)?,
                space: space(input)?,
            }),
            FlowClass::Drag => Ok(Self::Drag {
                model_id,
                from: point(input, fields::X, fields::Y)?,
                to: point(input, fields::X2, fields::Y2)?,
                space: space(input)?,
            }),
            FlowClass::Selection => {
                let raw = required(input, fields::IDS)?;
                let mut ids: Vec<String> = Vec::new();
                for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    if !ids.iter().any(|existing| existing == id) {
                        ids.push(id.to_string());
                    }
                }
                if ids.is_empty() {
                    return Err(ParameterError::invalid(fields::IDS, "no ids given"));
                }
                Ok(Self::Selection { model_id, ids })
            }
            FlowClass::Tree => Ok(Self::TreeNode {
                node_id: required(input, fields::TREE_NODE_ID)?.to_string(),
                node_type: required(input, fields::TREE_NODE_TYPE)?.to_string(),
            }),
            FlowClass::Slider => Ok(Self::Time {
                value: number(input, fields::TIME)?,
            }),
        }
    }

    /// The class this preload belongs to.
    #[must_use]
    pub fn class(&self) -> FlowClass {
        match self {
            Self::Menu { .. } => FlowClass::Menu,
            Self::Object { .. } => FlowClass::Popup,
            Self::Point { .. } => FlowClass::Click,
            Self::Drag { .. } => FlowClass::Drag,
            Self::Selection { .. } => FlowClass::Selection,
            Self::TreeNode { .. } => FlowClass::Tree,
            Self::Time { .. } => FlowClass::Slider,
        }
    }

    /// The model the preload targets, if it names one.
    #[must_use]
    pub fn model_id(&self) -> Option<&str> {
        match self {
            Self::Menu { model_id }
            | Self::Object { model_id, .. }
            | Self::Point { model_id, .. }
            | Self::Drag { model_id, .. }
            | Self::Selection { model_id, .. } => model_id.as_deref(),
            Self::TreeNode { .. } | Self::Time { .. } => None,
        }
    }

    /// A menu preload with no target model.
    #[must_use]
    pub fn menu() -> Self {
        Self::Menu { model_id: None }
    }
}

fn required<'a>(input: &'a impl RawInput, name: &str) -> Result<&'a str, ParameterError> {
    input.field(name).ok_or_else(|| ParameterError::missing(name))
}

/// Parses a required finite number.
pub(crate) fn number(input: &impl RawInput, name: &str) -> Result<f64, ParameterError> {
    let raw = required(input, name)?;
    let value: f64 = raw
        .parse()
        .map_err(|_| ParameterError::invalid(name, format!("'{raw}' is not a number")))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParameterError::invalid(name, "must be finite"))
    }
}

pub(crate) fn point(input: &impl RawInput, x: &str, y: &str) -> Result<Point, ParameterError> {
    Ok(Point::new(number(input, x)?, number(input, y)?))
}

pub(crate) fn space(input: &impl RawInput) -> Result<CoordSpace, ParameterError> {
    input.field(fields::SPACE).map_or(Ok(CoordSpace::Model), |raw| {
        raw.parse()
            .map_err(|reason: String| ParameterError::invalid(fields::SPACE, reason))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_popup_requires_object_id() {
        let err = Preload::parse(FlowClass::Popup, &input(&[("model_id", "root")])).unwrap_err();
        assert_eq!(err, ParameterError::missing("object_id"));

        let preload = Preload::parse(
            FlowClass::Popup,
            &input(&[("object_id", "n1"), ("sub_id", "port-2")]),
        )
        .unwrap();
        assert_eq!(
            preload,
            Preload::Object {
                model_id: None,
                object_id: "n1".to_string(),
                sub_id: Some("port-2".to_string()),
            }
        );
    }

    #[test]
    fn test_blank_fields_count_as_missing() {
        let err = Preload::parse(FlowClass::Popup, &input(&[("object_id", "   ")])).unwrap_err();
        assert_eq!(err, ParameterError::missing("object_id"));
    }

    #[test]
    fn test_click_point_and_space() {
        let preload = Preload::parse(
            FlowClass::Click,
            &input(&[("x", "12.5"), ("y", "-3"), ("space", "device")]),
        )
        .unwrap();
        assert_eq!(
            preload,
            Preload::Point {
                model_id: None,
                point: Point::new(12.5, -3.0),
                space: CoordSpace::Device,
            }
        );
    }

    #[test]
    fn test_click_rejects_non_finite_and_garbage() {
        assert!(matches!(
            Preload::parse(FlowClass::Click, &input(&[("x", "NaN"), ("y", "1")])),
            Err(ParameterError::InvalidField { .. })
        ));
        assert!(matches!(
            Preload::parse(FlowClass::Click, &input(&[("x", "abc"), ("y", "1")])),
            Err(ParameterError::InvalidField { .. })
        ));
        assert!(matches!(
            Preload::parse(FlowClass::Click, &input(&[("x", "1"), ("y", "1"), ("space", "paper")])),
            Err(ParameterError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_drag_needs_both_points() {
        let err = Preload::parse(FlowClass::Drag, &input(&[("x", "0"), ("y", "0"), ("x2", "5")]))
            .unwrap_err();
        assert_eq!(err, ParameterError::missing("y2"));
    }

    #[test]
    fn test_selection_dedupes_and_rejects_empty() {
        let preload =
            Preload::parse(FlowClass::Selection, &input(&[("ids", "n1, n2,n1,,")])).unwrap();
        assert_eq!(
            preload,
            Preload::Selection {
                model_id: None,
                ids: vec!["n1".to_string(), "n2".to_string()],
            }
        );

        assert!(matches!(
            Preload::parse(FlowClass::Selection, &input(&[("ids", " , ,")])),
            Err(ParameterError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_tree_and_slider() {
        let tree = Preload::parse(
            FlowClass::Tree,
            &input(&[("tree_node_id", "child"), ("tree_node_type", "model")]),
        )
        .unwrap();
        assert_eq!(tree.class(), FlowClass::Tree);

        let err = Preload::parse(FlowClass::Tree, &input(&[("tree_node_id", "child")])).unwrap_err();
        assert_eq!(err, ParameterError::missing("tree_node_type"));

        let time = Preload::parse(FlowClass::Slider, &input(&[("time", "4.25")])).unwrap();
        assert_eq!(time, Preload::Time { value: 4.25 });
    }

    #[test]
    fn test_model_id_is_carried() {
        let preload = Preload::parse(FlowClass::Menu, &input(&[("model_id", "child")])).unwrap();
        assert_eq!(preload.model_id(), Some("child"));
        assert_eq!(Preload::menu().model_id(), None);
    }

    #[test]
    fn test_class_parse() {
        assert_eq!("drag".parse::<FlowClass>(), Ok(FlowClass::Drag));
        assert!("keyboard".parse::<FlowClass>().is_err());
        assert_eq!(FlowClass::Slider.to_string(), "slider");
    }
}
