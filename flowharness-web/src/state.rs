//! Shared state for the HTTP handlers.

use flowharness::config::HarnessConfig;
use flowharness::context::{FlowContext, Model};
use flowharness::harness::SessionDriver;
use flowharness::session::InMemorySessionStore;
use std::sync::Arc;

/// Shared state for the API
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session driver around the shared flow context.
    pub driver: SessionDriver,
    /// The store behind the driver, kept for the reaper.
    pub store: Arc<InMemorySessionStore>,
}

impl AppState {
    /// Creates state over an in-memory store and the given context.
    pub fn new(config: HarnessConfig, context: FlowContext) -> Self {
        let store = Arc::new(InMemorySessionStore::from_config(&config));
        let driver = SessionDriver::new(store.clone(), context).with_config(config);
        Self { driver, store }
    }

    /// State around an empty root model.
    pub fn empty(config: HarnessConfig) -> Self {
        Self::new(config, FlowContext::new(Model::new("root", "Root")))
    }
}
