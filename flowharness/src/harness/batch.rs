//! Batch driver: fully preloaded, single-shot runs.

use super::Harness;
use crate::config::HarnessConfig;
use crate::context::FlowContext;
use crate::core::{Outcome, Preload, StepResult};
use crate::errors::HarnessError;
use crate::flow::FlowIdentity;
use tracing::warn;

/// Runs flows that must finish without asking for anything.
///
/// Any suspension is a hard failure and resets the harness.
#[derive(Debug, Default)]
pub struct BatchDriver {
    harness: Harness,
}

impl BatchDriver {
    /// Creates a driver with a fresh harness.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a driver using the configured step bound.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            harness: Harness::from_config(config),
        }
    }

    /// The harness.
    #[must_use]
    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    /// Runs one flow and returns its `Done` result.
    pub fn run(
        &mut self,
        identity: FlowIdentity,
        preload: Preload,
        ctx: &mut FlowContext,
    ) -> Result<StepResult, HarnessError> {
        let flow = identity.key().to_string();
        let result = self.harness.start(identity, preload, ctx);

        match result.outcome() {
            Outcome::Done => Ok(result),
            Outcome::Cancelled => Err(HarnessError::Cancelled { flow }),
            outcome if outcome.is_suspending() => {
                warn!(%flow, %outcome, "Batch flow suspended");
                self.harness.reset();
                Err(HarnessError::Suspended { flow, outcome })
            }
            _ => Err(HarnessError::FlowFailed {
                flow,
                message: result.error().unwrap_or("unknown failure").to_string(),
            }),
        }
    }

    /// Runs several flows in order, stopping at the first error.
    pub fn run_all(
        &mut self,
        runs: impl IntoIterator<Item = (FlowIdentity, Preload)>,
        ctx: &mut FlowContext,
    ) -> Result<Vec<StepResult>, HarnessError> {
        runs.into_iter()
            .map(|(identity, preload)| self.run(identity, preload, ctx))
            .collect()
    }
}
