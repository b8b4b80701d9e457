//! Per-entity mutation lock.
//!
//! The guard serializes remote mutations per entity: while a mutation for a
//! key is in flight, further mutation attempts for the same key fail fast
//! instead of issuing a duplicate request. Keys for different entities are
//! independent.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Errors produced by [`MutationGuard::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardError {
    /// A mutation for this entity is already in flight.
    #[error("a mutation for this entity is already in flight")]
    AlreadyInFlight,
}

/// Set of entity keys currently undergoing a remote mutation.
///
/// `acquire` either admits the caller and returns a [`MutationPermit`], or
/// fails fast with [`GuardError::AlreadyInFlight`]. The permit releases the
/// key on drop, so the lock is released on every exit path - success,
/// failure, or early return. A key must never remain held after the call
/// that acquired it settles.
///
/// # Example
///
/// ```
/// use booklane_core::guard::{GuardError, MutationGuard};
///
/// let guard: MutationGuard<&str> = MutationGuard::new();
///
/// let permit = guard.acquire("cart:42").unwrap();
/// assert!(matches!(
///     guard.acquire("cart:42").map(|_| ()),
///     Err(GuardError::AlreadyInFlight)
/// ));
///
/// drop(permit);
/// assert!(guard.acquire("cart:42").is_ok());
/// ```
#[derive(Debug)]
pub struct MutationGuard<K> {
    held: Arc<Mutex<HashSet<K>>>,
}

impl<K> MutationGuard<K>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self {
            held: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Try to acquire the lock for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::AlreadyInFlight`] if the key is currently held.
    pub fn acquire(&self, key: K) -> Result<MutationPermit<K>, GuardError> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        if !held.insert(key.clone()) {
            return Err(GuardError::AlreadyInFlight);
        }
        Ok(MutationPermit {
            key: Some(key),
            held: Arc::clone(&self.held),
        })
    }

    /// Whether a mutation for `key` is currently in flight.
    #[must_use]
    pub fn is_held(&self, key: &K) -> bool {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<K> Default for MutationGuard<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for MutationGuard<K> {
    fn clone(&self) -> Self {
        Self {
            held: Arc::clone(&self.held),
        }
    }
}

/// RAII permit for an in-flight mutation; releases its key on drop.
#[derive(Debug)]
pub struct MutationPermit<K: Eq + Hash> {
    key: Option<K>,
    held: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash> Drop for MutationPermit<K> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.held
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&key);
        }
    }
}
