//! Core data model of the harness.
//!
//! This module contains the values that travel between flows, the harness
//! and the protocol layer:
//! - Step outcomes and harness session states
//! - Preload variants and optional argument bundles
//! - Step state and the step result envelope
//! - Request descriptors and interaction answers

mod args;
mod geometry;
mod interaction;
mod payload;
pub mod preload;
mod result;
mod state;
mod status;

pub use args::{FlowArgs, MAX_ARG_VALUE_LEN};
pub use geometry::{CoordSpace, Point};
pub use interaction::{
    Click, ConfirmationChoice, DialogValues, Interaction, InteractionKind, Modifiers,
};
pub use payload::{
    ClickRequest, ConfirmationButtons, ConfirmationRequest, DialogField, DialogRequest,
    FieldKind, FrameRequest, Payload, ResultValues, Suspension,
};
pub use preload::{FlowClass, Preload, RawInput};
pub use result::StepResult;
pub use state::{ErasedState, StepState};
pub use status::{Outcome, SessionState};
