use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use tokio::sync::Mutex;
use tracing::debug;

use super::state::SessionState;
use super::types::SessionUpdate;

/// Exclusive handle to one session. Hold the lock for the whole turn.
pub type SessionHandle = Arc<Mutex<SessionState>>;

/// In-memory session registry with bounded size and idle expiry.
///
/// Each session sits behind its own async mutex, so turns for one session serialize
/// while different sessions proceed in parallel.
pub struct SessionStore {
    sessions: Cache<String, SessionHandle>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.sessions.entry_count())
            .finish()
    }
}

impl SessionStore {
    pub fn new(max_sessions: u64, idle: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Returns the session's handle, creating the session on first use.
    pub fn handle(&self, session_id: &str) -> SessionHandle {
        self.sessions.get_with(session_id.to_string(), || {
            debug!(session_id, "creating session");
            Arc::new(Mutex::new(SessionState::new(session_id)))
        })
    }

    /// Returns a snapshot of the session (waits for any in-flight turn).
    pub async fn load(&self, session_id: &str) -> SessionState {
        self.handle(session_id).lock().await.clone()
    }

    /// Merges `update` into the session.
    pub async fn update(&self, session_id: &str, update: SessionUpdate) {
        self.handle(session_id).lock().await.apply(update);
    }

    /// Replaces the session's reference list wholesale.
    pub async fn record_reference_list(
        &self,
        session_id: &str,
        items: Vec<String>,
        topic: Option<String>,
    ) {
        self.handle(session_id)
            .lock()
            .await
            .record_reference_list(items, topic);
    }

    pub async fn summarize(&self, session_id: &str) -> String {
        self.handle(session_id).lock().await.summarize()
    }

    /// Clears the session's memory, keeping its id.
    pub async fn reset(&self, session_id: &str) {
        self.handle(session_id).lock().await.clear();
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Number of live sessions (after pending evictions are applied).
    pub fn len(&self) -> u64 {
        self.sessions.run_pending_tasks();
        self.sessions.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
