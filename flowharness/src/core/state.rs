//! Per-invocation step state.
//!
//! A `StepState` is an immutable value: every transition consumes the old
//! state and produces a new one. The resume point is a typed value chosen by
//! each flow; the harness only ever sees the erased form
//! ([`ErasedState`]), whose resume point is plain JSON so it can be stored
//! between independent calls and restored later.

use super::{FlowArgs, Interaction, Preload};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A step state whose resume point has been erased to JSON.
pub type ErasedState = StepState<serde_json::Value>;

/// State threaded between the sub-steps of one flow instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepState<R> {
    /// Which sub-step runs next.
    resume: R,
    /// Data supplied by the triggering event.
    preload: Preload,
    /// Optional arguments of the flow identity.
    #[serde(default)]
    args: FlowArgs,
    /// Values carried from one sub-step to the next.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    scratch: BTreeMap<String, serde_json::Value>,
    /// The answer to the last suspension, re-injected on resume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input: Option<Interaction>,
}

impl<R> StepState<R> {
    /// Creates a freshly preloaded state.
    #[must_use]
    pub fn new(resume: R, preload: Preload, args: FlowArgs) -> Self {
        Self {
            resume,
            preload,
            args,
            scratch: BTreeMap::new(),
            input: None,
        }
    }

    /// The resume point.
    #[must_use]
    pub fn resume(&self) -> &R {
        &self.resume
    }

    /// The preload.
    #[must_use]
    pub fn preload(&self) -> &Preload {
        &self.preload
    }

    /// The flow arguments.
    #[must_use]
    pub fn args(&self) -> &FlowArgs {
        &self.args
    }

    /// The pending interaction answer, if any.
    #[must_use]
    pub fn input(&self) -> Option<&Interaction> {
        self.input.as_ref()
    }

    /// Gets a scratch value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.scratch.get(key)
    }

    /// Gets a scratch value as a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.scratch.get(key).and_then(serde_json::Value::as_str)
    }

    /// Gets a scratch value decoded into `T`.
    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.scratch
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Moves to another resume point.
    #[must_use]
    pub fn goto<R2>(self, resume: R2) -> StepState<R2> {
        StepState {
            resume,
            preload: self.preload,
            args: self.args,
            scratch: self.scratch,
            input: self.input,
        }
    }

    /// Stores a scratch value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.scratch.insert(key.into(), value.into());
        self
    }

    /// Injects the answer to a suspension.
    #[must_use]
    pub fn with_input(mut self, input: Interaction) -> Self {
        self.input = Some(input);
        self
    }

    /// Removes and returns the pending answer.
    #[must_use]
    pub fn take_input(mut self) -> (Option<Interaction>, Self) {
        let input = self.input.take();
        (input, self)
    }
}

impl<R: Serialize> StepState<R> {
    /// Erases the typed resume point to JSON.
    pub fn erase(self) -> Result<ErasedState, serde_json::Error> {
        let resume = serde_json::to_value(&self.resume)?;
        Ok(self.goto(resume))
    }
}

impl ErasedState {
    /// Restores a typed resume point from its JSON form.
    pub fn restore<R: DeserializeOwned>(self) -> Result<StepState<R>, serde_json::Error> {
        let resume = R::deserialize(&self.resume)?;
        Ok(self.goto(resume))
    }
}
