//! Ephemeral credential and session holder.
//!
//! Keeps the bearer token and the active assessment session id in memory
//! only. Every page of the flow reads from it; an authentication failure or
//! logout clears it.

use std::sync::{Arc, RwLock};

use tracing::info;

#[derive(Debug, Default)]
struct Inner {
    token: Option<String>,
    session_id: Option<String>,
}

/// Shared, cloneable session store
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Inner>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_token(token);
        store
    }

    pub fn token(&self) -> Option<String> {
        self.read(|inner| inner.token.clone())
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.write(|inner| inner.token = Some(token));
    }

    pub fn session_id(&self) -> Option<String> {
        self.read(|inner| inner.session_id.clone())
    }

    pub fn set_session_id(&self, session_id: impl Into<String>) {
        let session_id = session_id.into();
        self.write(|inner| inner.session_id = Some(session_id));
    }

    /// Whether a token is currently held
    pub fn is_authenticated(&self) -> bool {
        self.read(|inner| inner.token.is_some())
    }

    /// Drop token and session id
    pub fn clear(&self) {
        let had_state = self.read(|inner| inner.token.is_some() || inner.session_id.is_some());
        self.write(|inner| *inner = Inner::default());
        if had_state {
            info!("Session state cleared");
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> T {
        // A poisoned lock still holds consistent data: every write is a single assignment.
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut Inner)) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
        assert!(store.session_id().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::with_token("tok");
        let other = store.clone();
        other.set_session_id("sess-1");

        assert_eq!(store.token().as_deref(), Some("tok"));
        assert_eq!(store.session_id().as_deref(), Some("sess-1"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = SessionStore::with_token("tok");
        store.set_session_id("sess-1");
        store.clear();

        assert!(!store.is_authenticated());
        assert!(store.session_id().is_none());
    }
}
