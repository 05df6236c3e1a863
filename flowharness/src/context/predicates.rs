//! Read-only predicate snapshots used for flow enablement.

use serde::{Deserialize, Serialize};

/// A snapshot of the facts flows base their enablement on.
///
/// It is a plain value: checking enablement can never touch flow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Predicates {
    /// Number of nodes in the current model.
    pub node_count: usize,
    /// Whether anything is selected.
    pub has_selection: bool,
    /// Whether the current model is the root model.
    pub is_root_model: bool,
    /// Whether any model besides the root exists.
    pub has_sub_models: bool,
    /// Whether the external rendering tool is connected.
    pub external_tool_connected: bool,
}

impl Predicates {
    /// Whether the current model has any node.
    #[must_use]
    pub fn has_nodes(&self) -> bool {
        self.node_count > 0
    }
}
