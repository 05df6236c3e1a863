//! UI-state snapshots returned with every protocol response.

use super::FlowContext;
use crate::registry::FlowRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a caller needs to re-render after any call: current model,
/// selection, time and per-command enabled state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSnapshot {
    /// Current model id.
    pub current_model_id: String,
    /// Selected object ids, sorted.
    pub selection: Vec<String>,
    /// Time-slider value.
    pub time: f64,
    /// Enabled state per command key.
    pub commands: BTreeMap<String, bool>,
}

impl UiSnapshot {
    /// Captures a snapshot of the context.
    #[must_use]
    pub fn capture(ctx: &FlowContext) -> Self {
        Self {
            current_model_id: ctx.current_model_id().to_string(),
            selection: ctx.selection().iter().cloned().collect(),
            time: ctx.time(),
            commands: FlowRegistry::command_states(&ctx.predicates()),
        }
    }

    /// Returns true if the command is listed and enabled.
    #[must_use]
    pub fn is_enabled(&self, command: &str) -> bool {
        self.commands.get(command).copied().unwrap_or(false)
    }
}
