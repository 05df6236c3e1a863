//! The shared read/mutate context every flow step operates on.

use super::{Layout, Model, Predicates};
use crate::errors::FlowError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An image export recorded by the export flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Exported model.
    pub model_id: String,
    /// Image format.
    pub format: String,
    /// Scale factor.
    pub scale: f64,
}

/// Current model, selection, layout and the models themselves.
///
/// The context is not safe for concurrent mutation. Callers serialise all
/// flow processing behind one exclusive section (see
/// [`FlowLock`](crate::harness::FlowLock)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContextRecord")]
pub struct FlowContext {
    models: BTreeMap<String, Model>,
    root_id: String,
    current: String,
    selection: BTreeSet<String>,
    layout: Layout,
    time: f64,
    external_tool_connected: bool,
    exports: Vec<ExportRecord>,
}

/// A decoded context before its model ids are checked.
#[derive(Deserialize)]
struct ContextRecord {
    models: BTreeMap<String, Model>,
    root_id: String,
    current: String,
    selection: BTreeSet<String>,
    layout: Layout,
    time: f64,
    external_tool_connected: bool,
    exports: Vec<ExportRecord>,
}

impl TryFrom<ContextRecord> for FlowContext {
    type Error = String;

    fn try_from(record: ContextRecord) -> Result<Self, Self::Error> {
        if !record.models.contains_key(&record.root_id) {
            return Err(format!("root model '{}' is missing", record.root_id));
        }
        let (current, selection) = if record.models.contains_key(&record.current) {
            (record.current, record.selection)
        } else {
            (record.root_id.clone(), BTreeSet::new())
        };
        Ok(Self {
            models: record.models,
            root_id: record.root_id,
            current,
            selection,
            layout: record.layout,
            time: record.time,
            external_tool_connected: record.external_tool_connected,
            exports: record.exports,
        })
    }
}

impl FlowContext {
    /// Creates a context whose root and current model is `root`.
    #[must_use]
    pub fn new(mut root: Model) -> Self {
        root.parent = None;
        let root_id = root.id.clone();
        let mut models = BTreeMap::new();
        models.insert(root_id.clone(), root);
        Self {
            models,
            current: root_id.clone(),
            root_id,
            selection: BTreeSet::new(),
            layout: Layout::default(),
            time: 0.0,
            external_tool_connected: false,
            exports: Vec::new(),
        }
    }

    /// Adds a sub-model. Its parent must already exist.
    pub fn add_model(&mut self, model: Model) -> Result<(), FlowError> {
        if self.models.contains_key(&model.id) {
            return Err(FlowError::rejected(format!(
                "Model '{}' already exists",
                model.id
            )));
        }
        let parent = model
            .parent
            .clone()
            .ok_or_else(|| FlowError::rejected("Only the root model has no parent"))?;
        if !self.models.contains_key(&parent) {
            return Err(FlowError::not_found("model", parent));
        }
        self.models.insert(model.id.clone(), model);
        Ok(())
    }

    /// The root model id.
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// The current model id.
    #[must_use]
    pub fn current_model_id(&self) -> &str {
        &self.current
    }

    /// The current model.
    #[must_use]
    pub fn current_model(&self) -> &Model {
        // The current id always names a stored model. Decoding and every
        // mutation keep it so.
        &self.models[&self.current]
    }

    /// The current model, mutably.
    pub fn current_model_mut(&mut self) -> Result<&mut Model, FlowError> {
        let id = self.current.clone();
        self.models
            .get_mut(&id)
            .ok_or_else(|| FlowError::not_found("model", id))
    }

    /// Gets a model.
    #[must_use]
    pub fn model(&self, id: &str) -> Option<&Model> {
        self.models.get(id)
    }

    /// Makes `model_id` current if given; returns the id now current.
    ///
    /// Switching models clears the selection.
    pub fn focus(&mut self, model_id: Option<&str>) -> Result<String, FlowError> {
        if let Some(id) = model_id {
            if !self.models.contains_key(id) {
                return Err(FlowError::not_found("model", id));
            }
            if self.current != id {
                self.current = id.to_string();
                self.selection.clear();
            }
        }
        Ok(self.current.clone())
    }

    /// The current selection.
    #[must_use]
    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    /// Replaces the selection.
    pub fn set_selection<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = ids.into_iter().map(Into::into).collect();
    }

    /// The canvas layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Replaces the canvas layout.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    /// The time-slider value.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Sets the time-slider value.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Whether the external rendering tool is connected.
    #[must_use]
    pub fn external_tool_connected(&self) -> bool {
        self.external_tool_connected
    }

    /// Marks the external rendering tool as connected or not.
    pub fn set_external_tool_connected(&mut self, connected: bool) {
        self.external_tool_connected = connected;
    }

    /// Exports recorded so far.
    #[must_use]
    pub fn exports(&self) -> &[ExportRecord] {
        &self.exports
    }

    /// Records an export.
    pub fn record_export(&mut self, record: ExportRecord) {
        self.exports.push(record);
    }

    /// Removes a model and all its descendants.
    ///
    /// If the current model is removed, its nearest surviving ancestor
    /// becomes current. Returns the removed ids, the target first.
    pub fn remove_model(&mut self, id: &str) -> Result<Vec<String>, FlowError> {
        if id == self.root_id {
            return Err(FlowError::rejected("The root model cannot be deleted"));
        }
        let parent = self
            .models
            .get(id)
            .ok_or_else(|| FlowError::not_found("model", id))?
            .parent
            .clone()
            .unwrap_or_else(|| self.root_id.clone());

        let mut removed = vec![id.to_string()];
        let mut cursor = 0;
        while cursor < removed.len() {
            let children: Vec<String> = self
                .models
                .values()
                .filter(|m| m.parent.as_deref() == Some(removed[cursor].as_str()))
                .map(|m| m.id.clone())
                .collect();
            removed.extend(children);
            cursor += 1;
        }

        for gone in &removed {
            self.models.remove(gone);
        }
        if removed.contains(&self.current) {
            self.current = parent;
            self.selection.clear();
        }
        Ok(removed)
    }

    /// A read-only predicate snapshot for enablement checks.
    #[must_use]
    pub fn predicates(&self) -> Predicates {
        let model = self.current_model();
        Predicates {
            node_count: model.node_count(),
            has_selection: !self.selection.is_empty(),
            is_root_model: self.current == self.root_id,
            has_sub_models: self.models.len() > 1,
            external_tool_connected: self.external_tool_connected,
        }
    }
}
