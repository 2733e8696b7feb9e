//! Session management for the web interface
//!
//! Maps session tokens (stored in a cookie) to chat sessions. Sessions live in
//! memory only and are lost on restart. A session nobody has touched for the
//! idle timeout is dropped.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::chat::ChatSession;
use crate::config::DEFAULT_SESSION_IDLE_SECS;

/// Session token (UUID stored in cookie)
pub type SessionToken = String;

/// One browser session. The mutex serializes events within the session.
pub type SharedSession = Arc<Mutex<ChatSession>>;

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

impl SessionEntry {
    fn is_idle(&self, idle_timeout: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_seen) >= idle_timeout
    }
}

/// In-memory session store
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, SessionEntry>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_idle_timeout(Duration::from_secs(DEFAULT_SESSION_IDLE_SECS))
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub const fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Creates an empty session and returns its token.
    ///
    /// Idle sessions are evicted first, so cookieless traffic cannot grow the
    /// store past what arrived within one idle timeout.
    pub async fn create_session(&self) -> (SessionToken, SharedSession) {
        let token = Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(ChatSession::new(token.clone())));

        let mut sessions = self.sessions.write().await;
        let evicted = evict(&mut sessions, self.idle_timeout, Instant::now());
        sessions.insert(
            token.clone(),
            SessionEntry {
                session: Arc::clone(&session),
                last_seen: Instant::now(),
            },
        );
        drop(sessions);

        tracing::info!(session = %token, evicted, "Session created");
        (token, session)
    }

    /// Looks up a session and marks it as used. An idle session counts as gone.
    pub async fn get(&self, token: &str) -> Option<SharedSession> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if sessions
            .get(token)
            .is_some_and(|entry| entry.is_idle(self.idle_timeout, now))
        {
            sessions.remove(token);
            tracing::info!(session = %token, "Idle session expired");
            return None;
        }

        let entry = sessions.get_mut(token)?;
        entry.last_seen = now;
        Some(Arc::clone(&entry.session))
    }

    /// Drops every session idle for longer than the timeout. Returns how many
    /// were dropped.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let evicted = evict(&mut sessions, self.idle_timeout, Instant::now());
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Idle sessions evicted");
        }
        evicted
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn evict(
    sessions: &mut HashMap<SessionToken, SessionEntry>,
    idle_timeout: Duration,
    now: Instant,
) -> usize {
    let before = sessions.len();
    sessions.retain(|_, entry| !entry.is_idle(idle_timeout, now));
    before - sessions.len()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SHORT_IDLE: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_create_and_get() {
        let store = SessionStore::new();
        let (token, _) = store.create_session().await;

        let session = store.get(&token).await.unwrap();
        assert_eq!(session.lock().await.id(), token);
        assert_eq!(store.session_count().await, 1);
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let (first, _) = store.create_session().await;
        let (second, _) = store.create_session().await;
        assert_ne!(first, second);

        let a = store.get(&first).await.unwrap();
        let b = store.get(&second).await.unwrap();
        assert!(a.lock().await.transcript().is_empty());
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_evict_idle_drops_untouched_sessions() {
        let store = SessionStore::with_idle_timeout(SHORT_IDLE);
        store.create_session().await;
        store.create_session().await;

        assert_eq!(store.evict_idle().await, 0);
        tokio::time::sleep(SHORT_IDLE * 2).await;

        assert_eq!(store.evict_idle().await, 2);
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_get_keeps_session_alive() {
        let store = SessionStore::with_idle_timeout(Duration::from_millis(200));
        let (active, _) = store.create_session().await;
        let (idle, _) = store.create_session().await;

        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(store.get(&active).await.is_some());
        }

        assert!(store.get(&idle).await.is_none());
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_session_evicts_idle() {
        let store = SessionStore::with_idle_timeout(SHORT_IDLE);
        for _ in 0..10 {
            store.create_session().await;
        }
        tokio::time::sleep(SHORT_IDLE * 2).await;

        store.create_session().await;
        assert_eq!(store.session_count().await, 1);
    }
}
