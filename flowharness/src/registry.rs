//! Static flow registry.
//!
//! Every [`FlowKind`] maps to a singleton flow at compile time. String
//! lookup happens once, at the protocol boundary, in [`FlowRegistry::resolve`].

use crate::context::Predicates;
use crate::core::FlowClass;
use crate::errors::ParameterError;
use crate::flow::{FlowIdentity, FlowKind, StepFlow};
use crate::flows::{
    AddLink, AddNode, DeleteModel, ExportImage, MoveNodes, OpenModel, RenameNode, SelectMany,
    SelectNode, SetTime,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A registered command as listed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInfo {
    /// Command key.
    pub key: String,
    /// Trigger class.
    pub class: FlowClass,
    /// Whether the command can run right now.
    pub enabled: bool,
}

/// Lookup of the builtin flows.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowRegistry;

impl FlowRegistry {
    /// The flow singleton for a kind.
    #[must_use]
    pub fn get(kind: FlowKind) -> &'static dyn StepFlow {
        match kind {
            FlowKind::SelectNode => &SelectNode,
            FlowKind::SelectMany => &SelectMany,
            FlowKind::AddNode => &AddNode,
            FlowKind::AddLink => &AddLink,
            FlowKind::MoveNodes => &MoveNodes,
            FlowKind::RenameNode => &RenameNode,
            FlowKind::DeleteModel => &DeleteModel,
            FlowKind::OpenModel => &OpenModel,
            FlowKind::SetTime => &SetTime,
            FlowKind::ExportImage => &ExportImage,
        }
    }

    /// Resolves a `(class, key)` pair from the wire.
    pub fn resolve(class: &str, key: &str) -> Result<FlowKind, ParameterError> {
        let class: FlowClass = class.parse()?;
        let kind: FlowKind = key.parse()?;
        if kind.class() != class {
            return Err(ParameterError::ClassMismatch {
                key: key.to_string(),
                expected: kind.class().to_string(),
                requested: class.to_string(),
            });
        }
        Ok(kind)
    }

    /// The flow an identity runs.
    #[must_use]
    pub fn build(identity: &FlowIdentity) -> &'static dyn StepFlow {
        Self::get(identity.kind())
    }

    /// Every command with its enabled state.
    #[must_use]
    pub fn commands(predicates: &Predicates) -> Vec<CommandInfo> {
        FlowKind::ALL
            .into_iter()
            .map(|kind| CommandInfo {
                key: kind.key().to_string(),
                class: kind.class(),
                enabled: Self::get(kind).enabled(predicates),
            })
            .collect()
    }

    /// Enabled state per command key.
    #[must_use]
    pub fn command_states(predicates: &Predicates) -> BTreeMap<String, bool> {
        FlowKind::ALL
            .into_iter()
            .map(|kind| (kind.key().to_string(), Self::get(kind).enabled(predicates)))
            .collect()
    }
}
