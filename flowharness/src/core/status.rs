//! Step outcome and harness session state enums.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::InteractionKind;

/// The outcome attached to every step result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The flow wants its next sub-step run immediately. Never leaves a flow.
    Continue,
    /// The flow completed.
    Done,
    /// The flow was cancelled by the user.
    Cancelled,
    /// The flow failed.
    Failed,
    /// The flow waits for a modal dialog to be submitted.
    NeedsDialog,
    /// The flow waits for a yes/no(/cancel) answer.
    NeedsConfirmation,
    /// The flow waits for a click on the canvas.
    NeedsClick,
    /// The flow waits for a separate frame to be submitted.
    NeedsFrame,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::Done => write!(f, "done"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed => write!(f, "failed"),
            Self::NeedsDialog => write!(f, "needs_dialog"),
            Self::NeedsConfirmation => write!(f, "needs_confirmation"),
            Self::NeedsClick => write!(f, "needs_click"),
            Self::NeedsFrame => write!(f, "needs_frame"),
        }
    }
}

impl Outcome {
    /// Returns true if the outcome ends the flow.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Failed)
    }

    /// Returns true if the outcome suspends the flow until external input arrives.
    #[must_use]
    pub fn is_suspending(&self) -> bool {
        matches!(
            self,
            Self::NeedsDialog | Self::NeedsConfirmation | Self::NeedsClick | Self::NeedsFrame
        )
    }

    /// Returns the kind of answer a suspending outcome waits for.
    ///
    /// Frames are answered like dialogs: with submitted values or a cancel.
    #[must_use]
    pub fn awaits(&self) -> Option<InteractionKind> {
        match self {
            Self::NeedsDialog | Self::NeedsFrame => Some(InteractionKind::Dialog),
            Self::NeedsConfirmation => Some(InteractionKind::Confirmation),
            Self::NeedsClick => Some(InteractionKind::Click),
            _ => None,
        }
    }
}

/// The state of a harness session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No flow is in flight.
    #[default]
    Idle,
    /// A flow is being stepped.
    Active,
    /// A dialog or frame answer is outstanding.
    AwaitingDialog,
    /// A confirmation answer is outstanding.
    AwaitingConfirmation,
    /// A click is outstanding.
    AwaitingClick,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active => write!(f, "active"),
            Self::AwaitingDialog => write!(f, "awaiting_dialog"),
            Self::AwaitingConfirmation => write!(f, "awaiting_confirmation"),
            Self::AwaitingClick => write!(f, "awaiting_click"),
        }
    }
}

impl SessionState {
    /// The awaiting state matching an interaction kind.
    #[must_use]
    pub fn awaiting(kind: InteractionKind) -> Self {
        match kind {
            InteractionKind::Dialog => Self::AwaitingDialog,
            InteractionKind::Confirmation => Self::AwaitingConfirmation,
            InteractionKind::Click => Self::AwaitingClick,
        }
    }

    /// Returns true for any of the awaiting states.
    #[must_use]
    pub fn is_awaiting(&self) -> bool {
        self.expects().is_some()
    }

    /// The interaction kind this state waits for.
    #[must_use]
    pub fn expects(&self) -> Option<InteractionKind> {
        match self {
            Self::AwaitingDialog => Some(InteractionKind::Dialog),
            Self::AwaitingConfirmation => Some(InteractionKind::Confirmation),
            Self::AwaitingClick => Some(InteractionKind::Click),
            Self::Idle | Self::Active => None,
        }
    }
}
