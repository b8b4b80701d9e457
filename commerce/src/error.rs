//! Error taxonomy for commerce actions.

use booklane_core::guard::GuardError;
use booklane_gateway::GatewayError;
use thiserror::Error;

/// Result type alias for commerce operations.
pub type Result<T> = std::result::Result<T, CommerceError>;

/// Failures of the action orchestrators.
///
/// Nothing here is fatal to the process. Every failure leaves the store in
/// a previously-valid state: `Unauthenticated` and `AlreadyInFlight` are
/// rejected before any local or remote effect, and `NetworkOrServerError`
/// is surfaced only after the optimistic patch has been rolled back.
#[derive(Debug, Clone, Error)]
pub enum CommerceError {
    /// No session credential; the caller should redirect to login,
    /// preserving the return location. No network call was made.
    #[error("not authenticated - log in to continue")]
    Unauthenticated,

    /// A mutation for the same entity is still in flight. Silently ignored
    /// at the UI; the triggering control stays disabled until the pending
    /// call settles.
    #[error("a mutation for this entity is already in flight")]
    AlreadyInFlight,

    /// The remote call failed or returned a non-2xx response. Recoverable:
    /// local state was rolled back and the user may retry.
    #[error("network or server error: {0}")]
    NetworkOrServerError(#[from] GatewayError),
}

impl From<GuardError> for CommerceError {
    fn from(error: GuardError) -> Self {
        match error {
            GuardError::AlreadyInFlight => Self::AlreadyInFlight,
        }
    }
}
