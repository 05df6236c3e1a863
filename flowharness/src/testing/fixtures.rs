//! Test fixtures: seeded workspaces and request builders.

use std::collections::BTreeMap;

use crate::adapter::RawRequest;
use crate::context::{FlowContext, Layout, Model};
use crate::core::preload::fields;
use crate::core::{ConfirmationChoice, Point};
use crate::flow::FlowKind;

/// A seeded flow context builder.
///
/// [`TestWorkspace::new`] holds a root model with three nodes
/// (`n1` at (0, 0), `n2` at (100, 0), `n3` at (0, 100)) and a sub-model
/// `sub` holding `c1`.
#[derive(Debug, Clone)]
pub struct TestWorkspace {
    ctx: FlowContext,
}

impl TestWorkspace {
    /// Creates the standard seeded workspace.
    #[must_use]
    pub fn new() -> Self {
        let root = Model::new("root", "Plant")
            .with_node("n1", "Source", Point::new(0.0, 0.0))
            .with_node("n2", "Sink", Point::new(100.0, 0.0))
            .with_node("n3", "Tank", Point::new(0.0, 100.0));
        let mut ctx = FlowContext::new(root);
        let sub = Model::new("sub", "Pump station")
            .with_parent("root")
            .with_node("c1", "Pump", Point::new(10.0, 10.0));
        if let Err(err) = ctx.add_model(sub) {
            panic!("seeding the test workspace failed: {err}");
        }
        Self { ctx }
    }

    /// Creates a workspace with an empty root model only.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            ctx: FlowContext::new(Model::new("root", "Empty")),
        }
    }

    /// Adds a node to the current model.
    #[must_use]
    pub fn with_node(mut self, id: &str, label: &str, position: Point) -> Self {
        let current = self.ctx.current_model().clone().with_node(id, label, position);
        if let Ok(model) = self.ctx.current_model_mut() {
            *model = current;
        }
        self
    }

    /// Sets the selection.
    #[must_use]
    pub fn with_selection(mut self, ids: &[&str]) -> Self {
        self.ctx.set_selection(ids.iter().copied());
        self
    }

    /// Makes the given model current.
    #[must_use]
    pub fn focused_on(mut self, model_id: &str) -> Self {
        if let Err(err) = self.ctx.focus(Some(model_id)) {
            panic!("cannot focus test workspace on '{model_id}': {err}");
        }
        self
    }

    /// Connects the external rendering tool.
    #[must_use]
    pub fn with_external_tool(mut self) -> Self {
        self.ctx.set_external_tool_connected(true);
        self
    }

    /// Sets the canvas layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.ctx.set_layout(layout);
        self
    }

    /// Returns the built context.
    #[must_use]
    pub fn build(self) -> FlowContext {
        self.ctx
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A raw protocol request builder.
#[derive(Debug, Clone, Default)]
pub struct TestRequest {
    fields: BTreeMap<String, String>,
}

impl TestRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request for a command, with its class and key set.
    #[must_use]
    pub fn command(kind: FlowKind) -> Self {
        Self::new()
            .field(fields::COMMAND_CLASS, kind.class().as_str())
            .field(fields::COMMAND_KEY, kind.key())
    }

    /// Sets a raw field.
    #[must_use]
    pub fn field(mut self, name: &str, value: impl ToString) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    /// Sets an optional flow argument.
    #[must_use]
    pub fn arg(self, name: &str, value: &str) -> Self {
        self.field(&format!("{}{name}", fields::ARG_PREFIX), value)
    }

    /// Sets a dialog field answer.
    #[must_use]
    pub fn dialog_field(self, name: &str, value: &str) -> Self {
        self.field(&format!("{}{name}", fields::FIELD_PREFIX), value)
    }

    /// Sets the click (or first) point.
    #[must_use]
    pub fn at(self, x: f64, y: f64) -> Self {
        self.field(fields::X, x).field(fields::Y, y)
    }

    /// Sets a confirmation answer.
    #[must_use]
    pub fn choice(self, choice: ConfirmationChoice) -> Self {
        self.field(fields::CHOICE, choice)
    }

    /// Marks the request as a cancel.
    #[must_use]
    pub fn cancel(self) -> Self {
        self.field(fields::CANCEL, "true")
    }

    /// Echoes an interaction sequence number.
    #[must_use]
    pub fn seq(self, seq: u64) -> Self {
        self.field(fields::SEQ, seq)
    }

    /// Returns the request.
    #[must_use]
    pub fn build(self) -> RawRequest {
        RawRequest::from(self.fields)
    }
}
