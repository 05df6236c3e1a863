//! Error types for the harness.
//!
//! The taxonomy separates where an error is caught:
//! - [`ParameterError`]: malformed or missing request fields, rejected before
//!   any flow starts.
//! - [`ProtocolError`]: input that does not match what the harness is
//!   waiting for.
//! - [`FlowError`]: failures inside a flow's sub-steps. These never leave
//!   `step`; they become a `Failed` step result.
//!
//! User cancellation is not an error; it is a clean `Cancelled` outcome.

use crate::core::{ConfirmationChoice, InteractionKind, Outcome, SessionState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for harness drivers.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A request field was missing or invalid.
    #[error("{0}")]
    Parameter(#[from] ParameterError),

    /// An answer did not match the pending interaction.
    #[error("{0}")]
    Protocol(#[from] ProtocolError),

    /// A flow ended in `Failed`.
    #[error("Flow '{flow}' failed: {message}")]
    FlowFailed {
        /// The flow key.
        flow: String,
        /// The failure message.
        message: String,
    },

    /// A flow was cancelled.
    #[error("Flow '{flow}' was cancelled")]
    Cancelled {
        /// The flow key.
        flow: String,
    },

    /// A flow suspended where suspension is not allowed (batch runs).
    #[error("Flow '{flow}' suspended with {outcome}; batch runs must be fully preloaded")]
    Suspended {
        /// The flow key.
        flow: String,
        /// The suspending outcome.
        outcome: Outcome,
    },

    /// Invalid configuration.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Session storage failed.
    #[error("{0}")]
    Session(#[from] SessionError),
}

/// Stable, machine-readable error metadata for responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ErrorInfo {
    /// Error code (e.g., "PARAM-MISSING-FIELD").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// A request field was missing or invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// A required field is absent or blank.
    #[error("Missing required field '{field}'")]
    MissingField {
        /// The field name.
        field: String,
    },

    /// A field has an unusable value.
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField {
        /// The field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// No flow is registered under the requested key.
    #[error("Unknown command '{key}'")]
    UnknownCommand {
        /// The requested key.
        key: String,
    },

    /// The key exists but belongs to another command class.
    #[error("Command '{key}' is a {expected} command, not {requested}")]
    ClassMismatch {
        /// The requested key.
        key: String,
        /// The class the key is registered under.
        expected: String,
        /// The class the request named.
        requested: String,
    },

    /// An optional argument is malformed.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// The argument name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ParameterError {
    /// Creates a missing field error.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid field error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Machine-readable metadata.
    #[must_use]
    pub fn info(&self) -> ErrorInfo {
        match self {
            Self::MissingField { field } => {
                ErrorInfo::new("PARAM-MISSING-FIELD", self.to_string())
                    .with_context_entry("field", field)
            }
            Self::InvalidField { field, .. } => {
                ErrorInfo::new("PARAM-INVALID-FIELD", self.to_string())
                    .with_context_entry("field", field)
            }
            Self::UnknownCommand { key } => ErrorInfo::new("PARAM-UNKNOWN-COMMAND", self.to_string())
                .with_context_entry("command_key", key)
                .with_fix_hint("List available commands with GET /api/v1/commands."),
            Self::ClassMismatch { key, expected, .. } => {
                ErrorInfo::new("PARAM-CLASS-MISMATCH", self.to_string())
                    .with_context_entry("command_key", key)
                    .with_fix_hint(format!("Send command_class={expected}."))
            }
            Self::InvalidArgument { name, .. } => {
                ErrorInfo::new("PARAM-INVALID-ARGUMENT", self.to_string())
                    .with_context_entry("argument", name)
            }
        }
    }
}

/// An answer arrived that the harness is not waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Nothing is pending.
    #[error("No interaction is pending (harness is {state})")]
    NoPendingInteraction {
        /// Current harness state.
        state: SessionState,
    },

    /// The answer is of the wrong kind.
    #[error("Expected a {expected} answer, received a {received} answer")]
    UnexpectedInteraction {
        /// What the harness waits for.
        expected: InteractionKind,
        /// What arrived.
        received: InteractionKind,
    },

    /// The request carries no recognisable answer.
    #[error("Expected a {expected} answer, but the request carries none")]
    MissingAnswer {
        /// What the harness waits for.
        expected: InteractionKind,
    },

    /// The answer refers to an interaction that is no longer pending.
    #[error("Stale answer for interaction {received}; interaction {expected} is pending")]
    StaleInteraction {
        /// Sequence number of the pending interaction.
        expected: u64,
        /// Sequence number the answer carried.
        received: u64,
    },

    /// The confirmation choice is not one of the prompt's buttons.
    #[error("The pending prompt does not offer '{choice}'")]
    UnofferedChoice {
        /// The choice that arrived.
        choice: ConfirmationChoice,
    },
}

impl ProtocolError {
    /// Machine-readable metadata.
    #[must_use]
    pub fn info(&self) -> ErrorInfo {
        let code = match self {
            Self::NoPendingInteraction { .. } => "PROTOCOL-NOT-PENDING",
            Self::UnexpectedInteraction { .. } => "PROTOCOL-UNEXPECTED-ANSWER",
            Self::MissingAnswer { .. } => "PROTOCOL-MISSING-ANSWER",
            Self::StaleInteraction { .. } => "PROTOCOL-STALE-ANSWER",
            Self::UnofferedChoice { .. } => "PROTOCOL-UNOFFERED-CHOICE",
        };
        let info = ErrorInfo::new(code, self.to_string());
        match self {
            Self::StaleInteraction { expected, .. } => info
                .with_context_entry("seq", expected.to_string())
                .with_fix_hint("Re-render from the latest response before answering."),
            _ => info,
        }
    }
}

/// A failure inside a flow's sub-steps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// The flow was started with a preload of the wrong shape.
    #[error("Preload '{expected}' required")]
    WrongPreload {
        /// The preload variant the flow needs.
        expected: &'static str,
    },

    /// A referenced object does not exist.
    #[error("No {what} with id '{id}'")]
    NotFound {
        /// What was looked up.
        what: &'static str,
        /// The id.
        id: String,
    },

    /// The resumed state carries the wrong kind of answer.
    #[error("Expected a {expected} answer to resume")]
    UnexpectedInput {
        /// The answer kind the sub-step needs.
        expected: &'static str,
    },

    /// Input was well-formed but unusable.
    #[error("{0}")]
    Invalid(String),

    /// The operation is not possible in the current model state.
    #[error("{0}")]
    Rejected(String),

    /// Stored state could not be decoded.
    #[error("Corrupt step state: {0}")]
    CorruptState(String),
}

impl FlowError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            id: id.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Creates a rejected operation error.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        Self::CorruptState(err.to_string())
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid configuration value for {key} ('{value}'): {reason}")]
pub struct ConfigError {
    /// The setting name.
    pub key: String,
    /// The offending value.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// A session could not be stored or restored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The stored harness no longer decodes.
    #[error("Session '{session}' could not be decoded: {reason}")]
    Corrupt {
        /// The session id.
        session: String,
        /// The decoder message.
        reason: String,
    },

    /// The harness could not be encoded.
    #[error("Session '{session}' could not be encoded: {reason}")]
    Encode {
        /// The session id.
        session: String,
        /// The encoder message.
        reason: String,
    },
}
