//! Session driver: harnesses live in a store between stateless requests.

use super::Harness;
use crate::adapter::{FlowResponse, ProtocolAdapter, RawRequest, ResponseKind};
use crate::config::HarnessConfig;
use crate::context::{FlowContext, UiSnapshot};
use crate::core::{SessionState, StepResult};
use crate::errors::SessionError;
use crate::registry::{CommandInfo, FlowRegistry};
use crate::session::{SessionId, SessionStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// The process-wide exclusive section around all flow processing.
///
/// The context is not safe for concurrent mutation, so every dispatch
/// holds this lock from loading the harness until it is stored again.
pub type FlowLock = Mutex<FlowContext>;

/// What a caller sees of a stored session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// The session.
    pub session_id: SessionId,
    /// Harness state.
    pub state: SessionState,
    /// Key of the flow in flight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    /// Sequence number of the latest suspension.
    pub interaction_seq: u64,
    /// The suspended result, if awaiting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<StepResult>,
    /// Current UI state.
    pub snapshot: UiSnapshot,
}

/// Dispatches requests against harnesses kept in a [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionDriver {
    store: Arc<dyn SessionStore>,
    context: Arc<FlowLock>,
    config: HarnessConfig,
}

impl SessionDriver {
    /// Creates a driver over a store and the shared context.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, context: FlowContext) -> Self {
        Self {
            store,
            context: Arc::new(Mutex::new(context)),
            config: HarnessConfig::default(),
        }
    }

    /// Sets the configuration used for new harnesses.
    #[must_use]
    pub fn with_config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    /// The session store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// The locked context.
    #[must_use]
    pub fn context(&self) -> &Arc<FlowLock> {
        &self.context
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Creates and stores a new idle session.
    pub async fn create_session(&self) -> Result<SessionId, SessionError> {
        let id = SessionId::new();
        self.store.save(&id, &Harness::from_config(&self.config)).await?;
        debug!(session = %id, "Created session");
        Ok(id)
    }

    /// Handles one request for a session.
    ///
    /// A missing or expired session starts from a fresh harness. A request
    /// rejected before any flow ran does not create one.
    pub async fn dispatch(
        &self,
        session: &SessionId,
        request: &RawRequest,
    ) -> Result<FlowResponse, SessionError> {
        let mut ctx = self.context.lock().await;

        let (mut harness, existed) = match self.store.load(session).await {
            Ok(Some(harness)) => (harness, true),
            Ok(None) => (Harness::from_config(&self.config), false),
            // The record exists, so it is overwritten even by a rejected request.
            Err(err) => {
                warn!(session = %session, error = %err, "Replacing undecodable session");
                (Harness::from_config(&self.config), true)
            }
        };

        let response = ProtocolAdapter::dispatch(request, &mut harness, &mut ctx);

        if existed || response.kind != ResponseKind::ParameterError {
            self.store.save(session, &harness).await?;
        }
        Ok(response)
    }

    /// The status of a stored session.
    pub async fn status(&self, session: &SessionId) -> Result<Option<SessionStatus>, SessionError> {
        let ctx = self.context.lock().await;
        let Some(harness) = self.store.load(session).await? else {
            return Ok(None);
        };
        Ok(Some(SessionStatus {
            session_id: *session,
            state: harness.state(),
            flow: harness.current_flow().map(|f| f.key().to_string()),
            interaction_seq: harness.interaction_seq(),
            pending: harness.pending().cloned(),
            snapshot: UiSnapshot::capture(&ctx),
        }))
    }

    /// Resets and drops a session. Returns true if it existed.
    pub async fn end_session(&self, session: &SessionId) -> Result<bool, SessionError> {
        let _ctx = self.context.lock().await;
        if let Some(mut harness) = self.store.load(session).await? {
            harness.reset();
        }
        Ok(self.store.remove(session).await)
    }

    /// Every command with its enabled state.
    pub async fn commands(&self) -> Vec<CommandInfo> {
        let ctx = self.context.lock().await;
        FlowRegistry::commands(&ctx.predicates())
    }

    /// A snapshot of the current UI state.
    pub async fn snapshot(&self) -> UiSnapshot {
        UiSnapshot::capture(&*self.context.lock().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfirmationChoice;
    use crate::flow::FlowKind;
    use crate::session::InMemorySessionStore;
    use crate::testing::{assert_response, TestRequest, TestWorkspace};
    use std::time::Duration;

    fn driver() -> SessionDriver {
        SessionDriver::new(
            Arc::new(InMemorySessionStore::default()),
            TestWorkspace::new().build(),
        )
    }

    #[tokio::test]
    async fn test_pending_state_survives_between_requests() {
        let driver = driver();
        let session = driver.create_session().await.unwrap();
        let command = || TestRequest::command(FlowKind::AddLink);

        let first = driver.dispatch(&session, &command().build()).await.unwrap();
        assert_response(&first, ResponseKind::WaitingForClick);

        let second = driver
            .dispatch(&session, &command().at(0.0, 0.0).seq(1).build())
            .await
            .unwrap();
        assert_response(&second, ResponseKind::WaitingForClick);

        let third = driver
            .dispatch(&session, &command().at(100.0, 0.0).seq(2).build())
            .await
            .unwrap();
        assert_response(&third, ResponseKind::Success);

        let status = driver.status(&session).await.unwrap().unwrap();
        assert_eq!(status.state, SessionState::Idle);
        assert_eq!(driver.context().lock().await.current_model().links().len(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let driver = driver().with_config(HarnessConfig::default());
        let a = driver.create_session().await.unwrap();
        let b = driver.create_session().await.unwrap();

        driver
            .dispatch(&a, &TestRequest::command(FlowKind::AddLink).build())
            .await
            .unwrap();

        assert_eq!(
            driver.status(&a).await.unwrap().unwrap().state,
            SessionState::AwaitingClick
        );
        assert_eq!(driver.status(&b).await.unwrap().unwrap().state, SessionState::Idle);
    }

    #[tokio::test]
    async fn test_parameter_error_creates_no_session() {
        let driver = driver();
        let session = SessionId::new();

        let response = driver
            .dispatch(&session, &TestRequest::command(FlowKind::SelectNode).build())
            .await
            .unwrap();

        assert_response(&response, ResponseKind::ParameterError);
        assert!(driver.status(&session).await.unwrap().is_none());
        assert_eq!(driver.store().count().await, 0);
    }

    #[tokio::test]
    async fn test_undecodable_session_is_replaced_on_parameter_error() {
        let store = Arc::new(InMemorySessionStore::default());
        let driver = SessionDriver::new(store.clone(), TestWorkspace::new().build());
        let session = SessionId::new();
        store.insert_raw(&session, serde_json::json!({"state": 42}));
        assert!(matches!(
            driver.status(&session).await,
            Err(SessionError::Corrupt { .. })
        ));

        let response = driver
            .dispatch(&session, &TestRequest::command(FlowKind::SelectNode).build())
            .await
            .unwrap();

        assert_response(&response, ResponseKind::ParameterError);
        let status = driver.status(&session).await.unwrap().unwrap();
        assert_eq!(status.state, SessionState::Idle);
        assert_eq!(driver.store().count().await, 1);
    }

    #[tokio::test]
    async fn test_expired_session_restarts_idle() {
        let store = Arc::new(InMemorySessionStore::new(Duration::ZERO));
        let driver = SessionDriver::new(store, TestWorkspace::new().focused_on("sub").build());
        let session = SessionId::new();
        let command = || TestRequest::command(FlowKind::DeleteModel);

        let first = driver.dispatch(&session, &command().build()).await.unwrap();
        assert_response(&first, ResponseKind::NeedsConfirmation);

        // The answer arrives after the session expired, so it starts the flow again.
        let second = driver
            .dispatch(&session, &command().choice(ConfirmationChoice::Yes).build())
            .await
            .unwrap();
        assert_response(&second, ResponseKind::NeedsConfirmation);
        assert!(driver.context().lock().await.model("sub").is_some());
    }

    #[tokio::test]
    async fn test_end_session() {
        let driver = driver();
        let session = driver.create_session().await.unwrap();
        driver
            .dispatch(&session, &TestRequest::command(FlowKind::AddLink).build())
            .await
            .unwrap();

        assert!(driver.end_session(&session).await.unwrap());
        assert!(!driver.end_session(&session).await.unwrap());
        assert!(driver.status(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commands_follow_context() {
        let driver = driver();
        let commands = driver.commands().await;
        assert!(commands.iter().any(|c| c.key == "delete_model" && !c.enabled));
        assert!(driver.snapshot().await.is_enabled("add_link"));
    }
}
