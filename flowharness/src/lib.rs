//! # Flowharness
//!
//! A suspendable, resumable step-execution harness for user-invocable
//! operations ("flows").
//!
//! A flow is a small state machine. Each step either finishes, fails,
//! cancels, or suspends to ask for an interaction: a dialog, a yes/no
//! confirmation, a canvas click or an embedded frame. The [`harness`]
//! keeps the suspended state and resumes the flow with the answer.
//!
//! Three drivers run the same flows:
//!
//! - [`harness::InteractiveDriver`] answers suspensions through a listener
//! - [`harness::BatchDriver`] runs flows that must finish without asking
//! - [`harness::SessionDriver`] keeps one harness per session between
//!   stateless requests, translated by the [`adapter`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowharness::prelude::*;
//!
//! let mut ctx = FlowContext::new(
//!     Model::new("root", "Root")
//!         .with_node("a", "A", Point::new(0.0, 0.0))
//!         .with_node("b", "B", Point::new(100.0, 0.0)),
//! );
//! let mut harness = Harness::new();
//!
//! let asked = harness.start(FlowIdentity::bare(FlowKind::AddLink), Preload::menu(), &mut ctx);
//! assert_eq!(asked.outcome(), Outcome::NeedsClick);
//!
//! harness.submit_click(Click::at(0.0, 0.0), &mut ctx)?;
//! harness.submit_click(Click::at(100.0, 0.0), &mut ctx)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod adapter;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod flow;
pub mod flows;
pub mod harness;
pub mod registry;
pub mod session;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapter::{FlowResponse, ProtocolAdapter, RawRequest, ResponseKind};
    pub use crate::config::HarnessConfig;
    pub use crate::context::{FlowContext, Model, Predicates, UiSnapshot};
    pub use crate::core::{
        Click, ConfirmationChoice, CoordSpace, DialogValues, FlowArgs, FlowClass, Interaction,
        InteractionKind, Outcome, Payload, Point, Preload, SessionState, StepResult, StepState,
    };
    pub use crate::errors::{
        ErrorInfo, FlowError, HarnessError, ParameterError, ProtocolError, SessionError,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::flow::{Flow, FlowIdentity, FlowKind, StepFlow, Transition};
    pub use crate::harness::{
        BatchDriver, Harness, InteractionListener, InteractiveDriver, SessionDriver,
    };
    pub use crate::registry::{CommandInfo, FlowRegistry};
    pub use crate::session::{InMemorySessionStore, SessionId, SessionStore};
}
