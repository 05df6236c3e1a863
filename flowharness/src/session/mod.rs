//! Server-side storage of harnesses between independent requests.
//!
//! A stateless transport keeps nothing between calls; the whole pending
//! state of a session lives in a [`SessionStore`]. Sessions that stay idle
//! longer than the configured TTL are dropped, and an abandoned
//! `Awaiting*` session then behaves like a fresh idle one.

mod memory;
mod reaper;

pub use memory::InMemorySessionStore;
pub use reaper::spawn_reaper;

use crate::errors::SessionError;
use crate::harness::Harness;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifies one client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a random session id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying uuid.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Storage backend for session harnesses.
#[async_trait]
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Loads a session's harness. Expired sessions load as `None`.
    async fn load(&self, id: &SessionId) -> Result<Option<Harness>, SessionError>;

    /// Stores a session's harness and refreshes its last-seen time.
    async fn save(&self, id: &SessionId, harness: &Harness) -> Result<(), SessionError>;

    /// Removes a session. Returns true if it existed.
    async fn remove(&self, id: &SessionId) -> bool;

    /// Drops every expired session, returning how many were dropped.
    async fn purge_expired(&self) -> usize;

    /// Number of stored sessions, expired or not.
    async fn count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_round_trip() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_session_id_serializes_as_string() {
        let id = SessionId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::json!(id.to_string()));
    }
}
