//! Descriptors carried by suspending step results.

use super::{ConfirmationChoice, Outcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result values attached to a terminal step result.
pub type ResultValues = BTreeMap<String, serde_json::Value>;

/// The input widget a dialog field asks for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text.
    #[default]
    Text,
    /// A number.
    Number,
    /// One of a fixed set of options.
    Choice {
        /// Allowed options.
        options: Vec<String>,
    },
}

/// One field of a dialog or frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogField {
    /// Field name, used as the key of the submitted value.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Widget kind.
    #[serde(default)]
    pub kind: FieldKind,
    /// Pre-filled value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Whether the field must be filled.
    #[serde(default)]
    pub required: bool,
}

impl DialogField {
    /// Creates an optional text field.
    #[must_use]
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: FieldKind::Text,
            default: None,
            required: false,
        }
    }

    /// Sets the pre-filled value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A request to show a modal dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogRequest {
    /// Dialog title.
    pub title: String,
    /// Fields to show, in order.
    #[serde(default)]
    pub fields: Vec<DialogField>,
}

impl DialogRequest {
    /// Creates an empty dialog.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: DialogField) -> Self {
        self.fields.push(field);
        self
    }
}

/// A request to open a separate (non-modal) frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRequest {
    /// Which frame to open.
    pub frame: String,
    /// Frame title.
    pub title: String,
    /// Initial parameter values shown in the frame.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl FrameRequest {
    /// Creates a frame request.
    #[must_use]
    pub fn new(frame: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            frame: frame.into(),
            title: title.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Adds an initial parameter value.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// Which buttons a confirmation prompt offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationButtons {
    /// Yes / No.
    #[default]
    YesNo,
    /// Yes / No / Cancel.
    YesNoCancel,
}

impl ConfirmationButtons {
    /// Returns true if the prompt offers the given choice.
    #[must_use]
    pub fn offers(&self, choice: ConfirmationChoice) -> bool {
        match self {
            Self::YesNo => choice != ConfirmationChoice::Cancel,
            Self::YesNoCancel => true,
        }
    }
}

/// A yes/no(/cancel) prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    /// Prompt title.
    pub title: String,
    /// Question shown to the user.
    pub message: String,
    /// Offered buttons.
    #[serde(default)]
    pub buttons: ConfirmationButtons,
}

impl ConfirmationRequest {
    /// Creates a yes/no prompt.
    #[must_use]
    pub fn yes_no(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            buttons: ConfirmationButtons::YesNo,
        }
    }

    /// Creates a yes/no/cancel prompt.
    #[must_use]
    pub fn yes_no_cancel(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            buttons: ConfirmationButtons::YesNoCancel,
            ..Self::yes_no(title, message)
        }
    }
}

/// A request for a click on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickRequest {
    /// Prompt shown in the status line.
    pub prompt: String,
    /// What the click is used for (e.g. `link_source`).
    pub purpose: String,
    /// 1-based number of this point within a multi-click flow.
    pub index: u8,
}

impl ClickRequest {
    /// Creates a click request.
    #[must_use]
    pub fn new(prompt: impl Into<String>, purpose: impl Into<String>, index: u8) -> Self {
        Self {
            prompt: prompt.into(),
            purpose: purpose.into(),
            index,
        }
    }
}

/// What a suspended flow is waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "request", rename_all = "snake_case")]
pub enum Suspension {
    /// A modal dialog.
    Dialog(DialogRequest),
    /// A separate frame.
    Frame(FrameRequest),
    /// A confirmation prompt.
    Confirmation(ConfirmationRequest),
    /// A canvas click.
    Click(ClickRequest),
}

impl Suspension {
    /// The suspending outcome matching this request.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Dialog(_) => Outcome::NeedsDialog,
            Self::Frame(_) => Outcome::NeedsFrame,
            Self::Confirmation(_) => Outcome::NeedsConfirmation,
            Self::Click(_) => Outcome::NeedsClick,
        }
    }
}

/// The single payload a step result may carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payload", rename_all = "snake_case")]
pub enum Payload {
    /// What a suspended flow waits for.
    Request {
        /// The request.
        suspension: Suspension,
    },
    /// Values produced by a finished or cancelled flow.
    Values {
        /// The values.
        values: ResultValues,
    },
    /// Message of a failed flow.
    Error {
        /// Human-readable message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suspension_outcome() {
        assert_eq!(
            Suspension::Frame(FrameRequest::new("export", "Export")).outcome(),
            Outcome::NeedsFrame
        );
        assert_eq!(
            Suspension::Click(ClickRequest::new("Click", "point", 1)).outcome(),
            Outcome::NeedsClick
        );
    }

    #[test]
    fn test_buttons_offer() {
        assert!(!ConfirmationButtons::YesNo.offers(ConfirmationChoice::Cancel));
        assert!(ConfirmationButtons::YesNoCancel.offers(ConfirmationChoice::Cancel));
        assert!(ConfirmationButtons::YesNo.offers(ConfirmationChoice::No));
    }

    #[test]
    fn test_dialog_builder() {
        let dialog = DialogRequest::new("Rename")
            .field(DialogField::text("label", "Label").with_default("n1").required());

        assert_eq!(dialog.fields.len(), 1);
        assert!(dialog.fields[0].required);
        assert_eq!(dialog.fields[0].default.as_deref(), Some("n1"));
    }

    #[test]
    fn test_suspension_serialization_shape() {
        let json = serde_json::to_value(Suspension::Click(ClickRequest::new(
            "Pick the source",
            "link_source",
            1,
        )))
        .unwrap();
        assert_eq!(json["type"], "click");
        assert_eq!(json["request"]["purpose"], "link_source");
    }
}
