//! `SessionStore`: the concurrent session registry. Per-session turns are serialized by the
//! inner `tokio::sync::Mutex`; cross-session concurrency falls out of `DashMap`'s internal
//! sharding. Eviction never holds any lock across the scan — it snapshots candidate ids,
//! then locks and removes them one at a time.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::message::ConversationThread;
use crate::model::ConversationSession;

/// A session's full in-memory state: the wire-visible `ConversationSession` plus the
/// conversation thread, which is never serialized to the wire directly.
pub struct SessionEntry {
    pub session: ConversationSession,
    pub thread: ConversationThread,
}

impl SessionEntry {
    fn new(session_id: impl Into<String>) -> Self {
        Self {
            session: ConversationSession::new(session_id),
            thread: ConversationThread::new(),
        }
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Returns the existing session for `session_id` if present, otherwise creates a fresh
    /// one — with a freshly generated id if `session_id` is `None` or unknown.
    pub fn get_or_create(&self, session_id: Option<&str>) -> Arc<Mutex<SessionEntry>> {
        if let Some(id) = session_id {
            if let Some(entry) = self.sessions.get(id) {
                return entry.clone();
            }
        }
        let id = session_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let entry = Arc::new(Mutex::new(SessionEntry::new(id.clone())));
        self.sessions.insert(id, entry.clone());
        entry
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Mutex<SessionEntry>>> {
        self.sessions.get(session_id).map(|e| e.clone())
    }

    pub fn delete(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Snapshots every session's current `ConversationSession` for `GET /api/sessions`.
    pub async fn list(&self) -> Vec<ConversationSession> {
        let entries: Vec<Arc<Mutex<SessionEntry>>> =
            self.sessions.iter().map(|e| e.value().clone()).collect();
        let mut sessions = Vec::with_capacity(entries.len());
        for entry in entries {
            sessions.push(entry.lock().await.session.clone());
        }
        sessions
    }

    /// Removes every session whose `last_activity` is older than `Utc::now() - cutoff_hours`
    /// hours. Returns the number of sessions removed.
    pub async fn cleanup(&self, cutoff_hours: i64) -> usize {
        let cutoff = Utc::now() - ChronoDuration::hours(cutoff_hours);
        let snapshot: Vec<(String, Arc<Mutex<SessionEntry>>)> = self
            .sessions
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();

        let mut stale = Vec::new();
        for (id, entry) in snapshot {
            if entry.lock().await.session.last_activity < cutoff {
                stale.push(id);
            }
        }
        for id in &stale {
            self.sessions.remove(id);
        }
        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_reuses_known_session() {
        let store = SessionStore::new();
        let first = store.get_or_create(None);
        let id = first.lock().await.session.session_id.clone();

        let second = store.get_or_create(Some(&id));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn get_or_create_makes_a_new_session_for_an_unknown_id() {
        let store = SessionStore::new();
        let entry = store.get_or_create(Some("does-not-exist-yet"));
        assert_eq!(entry.lock().await.session.session_id, "does-not-exist-yet");
    }

    #[tokio::test]
    async fn delete_removes_a_known_session() {
        let store = SessionStore::new();
        let entry = store.get_or_create(None);
        let id = entry.lock().await.session.session_id.clone();
        assert!(store.delete(&id));
        assert!(store.get(&id).is_none());
    }

    #[tokio::test]
    async fn cleanup_evicts_only_stale_sessions() {
        let store = SessionStore::new();
        let fresh = store.get_or_create(None);
        let fresh_id = fresh.lock().await.session.session_id.clone();

        let stale = store.get_or_create(None);
        let stale_id = stale.lock().await.session.session_id.clone();
        stale.lock().await.session.last_activity = Utc::now() - ChronoDuration::hours(48);

        let removed = store.cleanup(24).await;

        assert_eq!(removed, 1);
        assert!(store.get(&fresh_id).is_some());
        assert!(store.get(&stale_id).is_none());
    }

    #[tokio::test]
    async fn list_reports_every_session() {
        let store = SessionStore::new();
        store.get_or_create(None);
        store.get_or_create(None);
        assert_eq!(store.list().await.len(), 2);
    }
}
