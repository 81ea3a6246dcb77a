//! In-memory chat sessions, one per open widget

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::assistant::{Activity, ConversationState};

/// Shared handle to one conversation. Held for the whole run of an utterance.
pub type SessionHandle = Arc<Mutex<ConversationState>>;

struct Session {
    conversation: SessionHandle,
    activity: Activity,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, state: ConversationState) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let activity = state.activity();
        let handle = Arc::new(Mutex::new(state));
        self.sessions.insert(
            id,
            Session {
                conversation: handle.clone(),
                activity,
            },
        );
        tracing::debug!("Opened chat session {} ({} active)", id, self.sessions.len());
        (id, handle)
    }

    pub fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.get(id).map(|entry| entry.conversation.clone())
    }

    /// Indicators of a session, readable while an utterance is running
    pub fn activity(&self, id: &Uuid) -> Option<Activity> {
        self.sessions.get(id).map(|entry| entry.activity.clone())
    }

    /// Drop a session; in-flight utterances keep their handle until they finish
    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::debug!("Closed chat session {}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = SessionStore::new();
        let (a, _) = store.create(ConversationState::new(Some("user_a".to_string())));
        let (b, _) = store.create(ConversationState::default());

        assert_ne!(a, b);
        assert_eq!(store.len(), 2);

        let state_a = store.get(&a).unwrap();
        state_a.lock().await.reset();
        assert_eq!(state_a.lock().await.buyer_id(), Some("user_a"));
        assert_eq!(store.get(&b).unwrap().lock().await.buyer_id(), None);
    }

    #[test]
    fn test_remove_unknown_session() {
        let store = SessionStore::new();
        let (id, handle) = store.create(ConversationState::default());

        assert!(store.remove(&id));
        assert!(!store.remove(&id));
        assert!(store.get(&id).is_none());
        assert!(store.is_empty());
        // Outstanding handles stay usable
        assert!(handle.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_activity_readable_while_conversation_locked() {
        let store = SessionStore::new();
        let (id, handle) = store.create(ConversationState::default());

        let mut conversation = handle.lock().await;
        conversation.reset();

        let activity = store.activity(&id).unwrap();
        assert!(!activity.is_typing());
        assert!(handle.try_lock().is_err());
        assert!(store.activity(&Uuid::new_v4()).is_none());
    }
}
