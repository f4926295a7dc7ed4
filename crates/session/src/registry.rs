//! Process-wide session registry.
//!
//! The registry lock is held only for lookup/create/remove.  Each session
//! carries its own exclusive lock, held by the runtime for the full duration
//! of a voice turn, so at most one request per session runs the pipeline at
//! a time while distinct sessions proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::state::SessionVoiceState;

pub type SessionHandle = Arc<Mutex<SessionVoiceState>>;

struct SessionEntry {
    handle: SessionHandle,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session's state handle, creating fresh state on first
    /// contact.
    pub async fn get_or_create(&self, session_id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.entry(session_id.to_string()).or_insert_with(|| {
            debug!(session = %session_id, "creating session voice state");
            SessionEntry {
                handle: Arc::new(Mutex::new(SessionVoiceState::new())),
                created_at: Utc::now(),
            }
        });
        Arc::clone(&entry.handle)
    }

    /// Destroy a session's state.  Returns `false` when the session was
    /// unknown.
    pub async fn end(&self, session_id: &str) -> bool {
        let removed = self.sessions.lock().await.remove(session_id);
        if let Some(entry) = &removed {
            info!(
                session = %session_id,
                lived_secs = (Utc::now() - entry.created_at).num_seconds(),
                "session ended"
            );
        }
        removed.is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_returns_the_same_state() {
        let registry = SessionRegistry::new();
        let first = registry.get_or_create("s1").await;
        first.lock().await.emotional_turn_index = 3;

        let second = registry.get_or_create("s1").await;
        assert_eq!(second.lock().await.emotional_turn_index, 3);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn distinct_sessions_get_distinct_state() {
        let registry = SessionRegistry::new();
        let a = registry.get_or_create("a").await;
        a.lock().await.emotional_turn_index = 9;

        let b = registry.get_or_create("b").await;
        assert_eq!(b.lock().await.emotional_turn_index, 0);
    }

    #[tokio::test]
    async fn ending_a_session_destroys_its_state() {
        let registry = SessionRegistry::new();
        {
            let handle = registry.get_or_create("gone").await;
            handle.lock().await.emotional_turn_index = 5;
        }
        assert!(registry.end("gone").await);
        assert!(!registry.end("gone").await);

        let fresh = registry.get_or_create("gone").await;
        assert_eq!(fresh.lock().await.emotional_turn_index, 0);
    }
}
