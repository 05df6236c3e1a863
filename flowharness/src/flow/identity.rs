//! Typed flow identifiers.

use crate::core::{FlowArgs, FlowClass};
use crate::errors::ParameterError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Every registered flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Select the clicked node.
    SelectNode,
    /// Select several objects at once.
    SelectMany,
    /// Add a node where the canvas was clicked.
    AddNode,
    /// Link two nodes picked by two clicks.
    AddLink,
    /// Move the selection by a drag.
    MoveNodes,
    /// Rename the clicked node.
    RenameNode,
    /// Delete the current model after confirmation.
    DeleteModel,
    /// Open the model picked in the tree.
    OpenModel,
    /// Move the time slider.
    SetTime,
    /// Export the current model as an image.
    ExportImage,
}

impl FlowKind {
    /// All kinds, in menu order.
    pub const ALL: [Self; 10] = [
        Self::SelectNode,
        Self::SelectMany,
        Self::AddNode,
        Self::AddLink,
        Self::MoveNodes,
        Self::RenameNode,
        Self::DeleteModel,
        Self::OpenModel,
        Self::SetTime,
        Self::ExportImage,
    ];

    /// The command key of the flow.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::SelectNode => "select_node",
            Self::SelectMany => "select_many",
            Self::AddNode => "add_node",
            Self::AddLink => "add_link",
            Self::MoveNodes => "move_nodes",
            Self::RenameNode => "rename_node",
            Self::DeleteModel => "delete_model",
            Self::OpenModel => "open_model",
            Self::SetTime => "set_time",
            Self::ExportImage => "export_image",
        }
    }

    /// The trigger class the flow is invoked from.
    #[must_use]
    pub fn class(&self) -> FlowClass {
        match self {
            Self::SelectNode | Self::RenameNode => FlowClass::Popup,
            Self::SelectMany => FlowClass::Selection,
            Self::AddNode => FlowClass::Click,
            Self::AddLink | Self::DeleteModel | Self::ExportImage => FlowClass::Menu,
            Self::MoveNodes => FlowClass::Drag,
            Self::OpenModel => FlowClass::Tree,
            Self::SetTime => FlowClass::Slider,
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FlowKind {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| ParameterError::UnknownCommand { key: s.to_string() })
    }
}

/// Which operation is requested: class, key and optional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowIdentity {
    kind: FlowKind,
    #[serde(default, skip_serializing_if = "FlowArgs::is_empty")]
    args: FlowArgs,
}

impl FlowIdentity {
    /// Creates an identity.
    #[must_use]
    pub fn new(kind: FlowKind, args: FlowArgs) -> Self {
        Self { kind, args }
    }

    /// Creates an identity without arguments.
    #[must_use]
    pub fn bare(kind: FlowKind) -> Self {
        Self::new(kind, FlowArgs::new())
    }

    /// The flow kind.
    #[must_use]
    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    /// The trigger class.
    #[must_use]
    pub fn class(&self) -> FlowClass {
        self.kind.class()
    }

    /// The command key.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.kind.key()
    }

    /// The optional arguments.
    #[must_use]
    pub fn args(&self) -> &FlowArgs {
        &self.args
    }

    /// A stable hex digest of the identity.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.class().as_str().as_bytes());
        hasher.update(b":");
        hasher.update(self.key().as_bytes());
        for (name, value) in self.args.iter() {
            hasher.update(b";");
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }
}

impl fmt::Display for FlowIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.class(), self.key())?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, "[{}]", args.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        for kind in FlowKind::ALL {
            assert_eq!(kind.key().parse::<FlowKind>(), Ok(kind));
        }
        assert!(matches!(
            "draw_circle".parse::<FlowKind>(),
            Err(ParameterError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn test_display() {
        let identity = FlowIdentity::new(
            FlowKind::AddNode,
            FlowArgs::from_pairs([("label", "Pump")]).unwrap(),
        );
        assert_eq!(identity.to_string(), "click/add_node[label=Pump]");
        assert_eq!(FlowIdentity::bare(FlowKind::AddLink).to_string(), "menu/add_link");
    }

    #[test]
    fn test_fingerprint_depends_on_args() {
        let bare = FlowIdentity::bare(FlowKind::AddNode);
        let labelled = FlowIdentity::new(
            FlowKind::AddNode,
            FlowArgs::from_pairs([("label", "Pump")]).unwrap(),
        );
        assert_eq!(bare.fingerprint(), FlowIdentity::bare(FlowKind::AddNode).fingerprint());
        assert_ne!(bare.fingerprint(), labelled.fingerprint());
        assert_eq!(bare.fingerprint().len(), 32);
    }
}
