//! In-memory session store with idle expiry.

use super::{SessionId, SessionStore};
use crate::config::HarnessConfig;
use crate::errors::SessionError;
use crate::events::{get_event_sink, types};
use crate::harness::Harness;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// A stored harness with its last-seen time.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    harness: serde_json::Value,
    last_seen: DateTime<Utc>,
}

/// Keeps sessions in a concurrent map, serialised to JSON.
///
/// Entries idle for longer than the TTL are treated as absent and dropped
/// on the next load or purge.
#[derive(Debug)]
pub struct InMemorySessionStore {
    entries: DashMap<SessionId, SessionRecord>,
    ttl: chrono::Duration,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::from_config(&HarnessConfig::default())
    }
}

impl InMemorySessionStore {
    /// Creates a store with the given idle TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::weeks(52 * 100)),
        }
    }

    /// Creates a store with the configured TTL.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.session_ttl())
    }

    /// Returns true if no sessions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// When a session was last stored.
    #[must_use]
    pub fn last_seen(&self, id: &SessionId) -> Option<DateTime<Utc>> {
        self.entries.get(id).map(|record| record.last_seen)
    }

    /// Drops every session that is expired at `now`.
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<SessionId> = self
            .entries
            .iter()
            .filter(|entry| self.is_expired(entry.value(), now))
            .map(|entry| *entry.key())
            .collect();

        let sink = get_event_sink();
        let mut purged = 0;
        for id in expired {
            if self
                .entries
                .remove_if(&id, |_, record| self.is_expired(record, now))
                .is_some()
            {
                debug!(session = %id, "Session expired");
                sink.try_emit(
                    types::SESSION_EXPIRED,
                    Some(serde_json::json!({"session_id": id})),
                );
                purged += 1;
            }
        }
        purged
    }

    /// Stores a raw JSON record, bypassing harness encoding.
    #[cfg(test)]
    pub(crate) fn insert_raw(&self, id: &SessionId, harness: serde_json::Value) {
        self.entries.insert(
            *id,
            SessionRecord {
                harness,
                last_seen: Utc::now(),
            },
        );
    }

    fn is_expired(&self, record: &SessionRecord, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(record.last_seen) >= self.ttl
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Harness>, SessionError> {
        let now = Utc::now();
        if self
            .entries
            .remove_if(id, |_, record| self.is_expired(record, now))
            .is_some()
        {
            info!(session = %id, "Dropped expired session on load");
            return Ok(None);
        }

        let Some(record) = self.entries.get(id).map(|r| r.harness.clone()) else {
            return Ok(None);
        };
        serde_json::from_value(record)
            .map(Some)
            .map_err(|err| SessionError::Corrupt {
                session: id.to_string(),
                reason: err.to_string(),
            })
    }

    async fn save(&self, id: &SessionId, harness: &Harness) -> Result<(), SessionError> {
        let harness = serde_json::to_value(harness).map_err(|err| SessionError::Encode {
            session: id.to_string(),
            reason: err.to_string(),
        })?;
        self.entries.insert(
            *id,
            SessionRecord {
                harness,
                last_seen: Utc::now(),
            },
        );
        Ok(())
    }

    async fn remove(&self, id: &SessionId) -> bool {
        self.entries.remove(id).is_some()
    }

    async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    async fn count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Preload, SessionState};
    use crate::flow::{FlowIdentity, FlowKind};
    use crate::testing::TestWorkspace;

    fn awaiting_harness() -> Harness {
        let mut ctx = TestWorkspace::new().build();
        let mut harness = Harness::new();
        harness.start(FlowIdentity::bare(FlowKind::AddLink), Preload::menu(), &mut ctx);
        harness
    }

    #[tokio::test]
    async fn test_save_and_load_restores_pending_state() {
        let store = InMemorySessionStore::default();
        let id = SessionId::new();
        let harness = awaiting_harness();

        store.save(&id, &harness).await.unwrap();
        let loaded = store.load(&id).await.unwrap().unwrap();

        assert_eq!(loaded.state(), SessionState::AwaitingClick);
        assert_eq!(loaded.pending(), harness.pending());
        assert_eq!(loaded.interaction_token(), harness.interaction_token());
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_session_loads_none() {
        let store = InMemorySessionStore::default();
        assert!(store.load(&SessionId::new()).await.unwrap().is_none());
        assert!(!store.remove(&SessionId::new()).await);
    }

    #[tokio::test]
    async fn test_expired_session_loads_none() {
        let store = InMemorySessionStore::new(Duration::ZERO);
        let id = SessionId::new();
        store.save(&id, &awaiting_harness()).await.unwrap();

        assert!(store.load(&id).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_only_drops_idle_sessions() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let old = SessionId::new();
        let fresh = SessionId::new();
        tokio_test::block_on(store.save(&old, &Harness::new())).unwrap();
        tokio_test::block_on(store.save(&fresh, &Harness::new())).unwrap();

        let now = Utc::now();
        assert_eq!(store.purge_expired_at(now), 0);

        let later = now + chrono::Duration::seconds(61);
        assert_eq!(store.purge_expired_at(later), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_error() {
        let store = InMemorySessionStore::default();
        let id = SessionId::new();
        store.entries.insert(
            id,
            SessionRecord {
                harness: serde_json::json!({"state": "sleeping"}),
                last_seen: Utc::now(),
            },
        );

        let err = store.load(&id).await.unwrap_err();
        assert!(matches!(err, SessionError::Corrupt { .. }));
    }
}
