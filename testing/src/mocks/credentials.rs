//! In-memory credential store.

use crate::fixtures;
use booklane_commerce::{Credential, CredentialStore};
use std::sync::{Arc, Mutex, PoisonError};

/// Credential store backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    credential: Arc<Mutex<Option<Credential>>>,
}

impl MemoryCredentialStore {
    /// Empty store: no active session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with a test session.
    #[must_use]
    pub fn authenticated() -> Self {
        let store = Self::new();
        store.set(Credential {
            token: "test-token".to_owned(),
            user: fixtures::user("test@example.com"),
        });
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, credential: Credential) {
        *self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential);
    }

    fn clear(&self) {
        *self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}
