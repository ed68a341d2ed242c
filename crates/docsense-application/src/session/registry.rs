use docsense_core::session::ConversationSession;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared handle to one chat's session.
pub type SharedSession = Arc<Mutex<ConversationSession>>;

/// In-memory registry of conversation sessions, one per chat id.
///
/// Sessions are created on first use and live as long as the registry;
/// nothing is persisted.
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SharedSession>>>,
}

impl SessionRegistry {
    /// Creates a new empty SessionRegistry.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the session for `session_id`, creating an empty one if needed.
    ///
    /// # Arguments
    ///
    /// * `session_id` - The chat id the session belongs to
    pub async fn get_or_create(&self, session_id: &str) -> SharedSession {
        if let Some(session) = self.get(session_id).await {
            return session;
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!("[SessionRegistry] Created session {}", session_id);
                Arc::new(Mutex::new(ConversationSession::new(session_id)))
            })
            .clone()
    }

    /// Gets a session by chat id.
    ///
    /// # Returns
    ///
    /// `Some(session)` if the session exists, `None` otherwise.
    pub async fn get(&self, session_id: &str) -> Option<SharedSession> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
