//! Answers to pending interactions.
//!
//! When a flow suspends, the next external input arrives as one of these
//! values. The harness merges it into the resumed [`StepState`](super::StepState)
//! so the flow's next sub-step can read it.

use super::{CoordSpace, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Values submitted from a dialog or frame, keyed by field name.
pub type DialogValues = BTreeMap<String, String>;

/// The kind of external input a suspended flow waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Dialog or frame field values.
    Dialog,
    /// A yes/no/cancel choice.
    Confirmation,
    /// A point clicked on the canvas.
    Click,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dialog => write!(f, "dialog"),
            Self::Confirmation => write!(f, "confirmation"),
            Self::Click => write!(f, "click"),
        }
    }
}

/// The answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationChoice {
    /// Proceed.
    Yes,
    /// Do not proceed.
    No,
    /// Abort the whole operation.
    Cancel,
}

impl fmt::Display for ConfirmationChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

impl FromStr for ConfirmationChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yes" | "y" | "ok" => Ok(Self::Yes),
            "no" | "n" => Ok(Self::No),
            "cancel" => Ok(Self::Cancel),
            other => Err(format!("unknown confirmation choice '{other}'")),
        }
    }
}

/// Keyboard modifiers held during a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    /// Shift held.
    #[serde(default)]
    pub shift: bool,
    /// Control held.
    #[serde(default)]
    pub ctrl: bool,
    /// Alt held.
    #[serde(default)]
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };
}

/// A click delivered to a flow waiting for one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Click {
    /// Where the click landed.
    pub point: Point,
    /// Space `point` is expressed in.
    #[serde(default)]
    pub space: CoordSpace,
    /// Modifier keys held.
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl Click {
    /// A plain model-space click.
    #[must_use]
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            point: Point::new(x, y),
            space: CoordSpace::Model,
            modifiers: Modifiers::NONE,
        }
    }

    /// Sets the coordinate space.
    #[must_use]
    pub const fn in_space(mut self, space: CoordSpace) -> Self {
        self.space = space;
        self
    }

    /// Sets the modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// An answer to a pending interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    /// Submitted dialog or frame values.
    Dialog {
        /// Field values.
        values: DialogValues,
    },
    /// A confirmation choice.
    Confirmation {
        /// The choice.
        choice: ConfirmationChoice,
    },
    /// A click.
    Click {
        /// The click.
        click: Click,
    },
}

impl Interaction {
    /// The kind of interaction this answers.
    #[must_use]
    pub fn kind(&self) -> InteractionKind {
        match self {
            Self::Dialog { .. } => InteractionKind::Dialog,
            Self::Confirmation { .. } => InteractionKind::Confirmation,
            Self::Click { .. } => InteractionKind::Click,
        }
    }

    /// Wraps dialog values.
    #[must_use]
    pub fn dialog(values: DialogValues) -> Self {
        Self::Dialog { values }
    }

    /// Wraps a confirmation choice.
    #[must_use]
    pub fn confirmation(choice: ConfirmationChoice) -> Self {
        Self::Confirmation { choice }
    }

    /// Wraps a click.
    #[must_use]
    pub fn click(click: Click) -> Self {
        Self::Click { click }
    }
}
