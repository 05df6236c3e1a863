//! The shared context flows read and mutate.
//!
//! This module provides:
//! - Graph models and the canvas layout
//! - The `FlowContext` holding current model, selection and layout
//! - Predicate snapshots for enablement checks
//! - UI snapshots returned to protocol callers

mod model;
mod predicates;
mod snapshot;
mod workspace;

pub use model::{Layout, Link, Model, Node};
pub use predicates::Predicates;
pub use snapshot::UiSnapshot;
pub use workspace::{ExportRecord, FlowContext};
