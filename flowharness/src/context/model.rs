//! Graph models held by the flow context.

use crate::core::{CoordSpace, Point};
use crate::errors::FlowError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node id, unique within its model.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Position in model coordinates.
    pub position: Point,
}

/// A directed link between two nodes of the same model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link id, unique within its model.
    pub id: String,
    /// Source node.
    pub from: String,
    /// Target node.
    pub to: String,
}

/// A graph model. Models nest through `parent`; the root has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Model id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Parent model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    nodes: BTreeMap<String, Node>,
    links: Vec<Link>,
    next_id: u64,
}

impl Model {
    /// Creates an empty root model.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent: None,
            nodes: BTreeMap::new(),
            links: Vec::new(),
            next_id: 1,
        }
    }

    /// Sets the parent model.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Adds a node with a given id (builder form, used for seeding).
    #[must_use]
    pub fn with_node(mut self, id: impl Into<String>, label: impl Into<String>, position: Point) -> Self {
        let id = id.into();
        self.nodes.insert(
            id.clone(),
            Node {
                id,
                label: label.into(),
                position,
            },
        );
        self
    }

    /// Gets a node.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Returns true if the node exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Iterates over nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The links of the model.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The node closest to `point`, if any.
    #[must_use]
    pub fn nearest_node(&self, point: &Point) -> Option<&Node> {
        self.nodes.values().min_by(|a, b| {
            a.position
                .distance(point)
                .total_cmp(&b.position.distance(point))
        })
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        loop {
            let id = format!("{prefix}{}", self.next_id);
            self.next_id += 1;
            let taken = self.nodes.contains_key(&id) || self.links.iter().any(|l| l.id == id);
            if !taken {
                return id;
            }
        }
    }

    /// Adds a node with a generated id and returns the id.
    pub fn add_node(&mut self, label: impl Into<String>, position: Point) -> String {
        let id = self.fresh_id("n");
        self.nodes.insert(
            id.clone(),
            Node {
                id: id.clone(),
                label: label.into(),
                position,
            },
        );
        id
    }

    /// Relabels a node.
    pub fn rename_node(&mut self, id: &str, label: impl Into<String>) -> Result<(), FlowError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| FlowError::not_found("node", id))?;
        node.label = label.into();
        Ok(())
    }

    /// Moves the given nodes by `offset`; unknown ids are ignored.
    ///
    /// Returns the number of nodes moved.
    pub fn translate<'a>(&mut self, ids: impl IntoIterator<Item = &'a String>, offset: &Point) -> usize {
        let mut moved = 0;
        for id in ids {
            if let Some(node) = self.nodes.get_mut(id) {
                node.position = node.position.translate(offset);
                moved += 1;
            }
        }
        moved
    }

    /// Links two existing, distinct nodes and returns the link id.
    pub fn add_link(&mut self, from: &str, to: &str) -> Result<String, FlowError> {
        for id in [from, to] {
            if !self.nodes.contains_key(id) {
                return Err(FlowError::not_found("node", id));
            }
        }
        if from == to {
            return Err(FlowError::rejected("A node cannot be linked to itself"));
        }
        if self.links.iter().any(|l| l.from == from && l.to == to) {
            return Err(FlowError::rejected(format!(
                "Nodes '{from}' and '{to}' are already linked"
            )));
        }

        let id = self.fresh_id("l");
        self.links.push(Link {
            id: id.clone(),
            from: from.to_string(),
            to: to.to_string(),
        });
        Ok(id)
    }
}

/// The canvas viewport, mapping device coordinates onto the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Model point shown at the device origin.
    pub origin: Point,
    /// Device pixels per model unit.
    pub scale: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            origin: Point::default(),
            scale: 1.0,
        }
    }
}

impl Layout {
    /// Converts a point into model coordinates.
    #[must_use]
    pub fn to_model(&self, point: Point, space: CoordSpace) -> Point {
        match space {
            CoordSpace::Model => point,
            CoordSpace::Device => Point::new(
                point.x / self.scale + self.origin.x,
                point.y / self.scale + self.origin.y,
            ),
        }
    }
}
