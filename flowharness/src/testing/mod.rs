//! Testing utilities for flows and harnesses.
//!
//! This module provides:
//! - A seeded workspace and a raw request builder
//! - Mock flows and a scripted interaction listener
//! - Assertions for step results, harness states and responses

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_cancelled, assert_done, assert_failed, assert_outcome, assert_response, assert_state,
    assert_value,
};
pub use fixtures::{TestRequest, TestWorkspace};
pub use mocks::{FailingFlow, PanickingFlow, ScriptedListener, SpinningFlow};
