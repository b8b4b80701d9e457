//! Session context and credential storage.
//!
//! Instead of reading an ambient browser store, orchestrators receive an
//! explicit [`SessionContext`] over an abstract [`CredentialStore`]
//! capability. The production implementation persists to whatever
//! key-value storage the host provides; tests use an in-memory store.

use crate::error::{CommerceError, Result};
use booklane_gateway::UserProfile;

/// The authenticated session credential plus the profile it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    /// Opaque bearer token sent with every authenticated request
    pub token: String,
    /// Profile of the authenticated user
    pub user: UserProfile,
}

/// Abstract credential storage capability.
///
/// `get`/`set`/`clear` are synchronous: the backing store is local
/// key-value storage, not a network service.
pub trait CredentialStore: Send + Sync {
    /// Current credential, if a session is active.
    fn get(&self) -> Option<Credential>;

    /// Store the credential for the active session.
    fn set(&self, credential: Credential);

    /// Remove the stored credential.
    fn clear(&self);
}

/// Session context threaded through the orchestrators.
#[derive(Debug, Clone)]
pub struct SessionContext<C: CredentialStore> {
    credentials: C,
}

impl<C: CredentialStore> SessionContext<C> {
    /// Wrap a credential store.
    pub const fn new(credentials: C) -> Self {
        Self { credentials }
    }

    /// Whether a credential is present.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.get().is_some()
    }

    /// The bearer token for the active session.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Unauthenticated`] when no credential is
    /// stored.
    pub fn bearer(&self) -> Result<String> {
        self.credentials
            .get()
            .map(|credential| credential.token)
            .ok_or(CommerceError::Unauthenticated)
    }

    /// Profile of the authenticated user, if any.
    pub fn user(&self) -> Option<UserProfile> {
        self.credentials.get().map(|credential| credential.user)
    }

    /// Store a freshly obtained credential.
    pub fn establish(&self, credential: Credential) {
        self.credentials.set(credential);
    }

    /// Clear the stored credential.
    pub fn clear(&self) {
        self.credentials.clear();
    }
}
