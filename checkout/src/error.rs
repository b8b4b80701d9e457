//! Checkout error taxonomy.

use crate::form::FormField;
use booklane_gateway::{GatewayError, PaymentRejection};
use thiserror::Error;

/// Failures of a checkout attempt.
///
/// None of these are fatal to the session: the form stays editable, the
/// cart stays untouched, and the user may resubmit. Only
/// `AlreadyCompleted` is terminal, and only because the checkout already
/// succeeded.
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    /// Checkout was entered with an empty cart.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// The session already succeeded; no state is re-entered after
    /// `Succeeded`.
    #[error("checkout already completed")]
    AlreadyCompleted,

    /// One or more required fields were blank. Field-scoped and
    /// non-fatal; blocks progression only.
    #[error("form validation failed for {} field(s)", fields.len())]
    ValidationFailed {
        /// The blank fields, in form order
        fields: Vec<FormField>,
    },

    /// The payment SDK has not finished initializing.
    #[error("payment sdk is not ready")]
    PaymentSdkNotReady,

    /// Card declined or SDK error. Recoverable: the user may retry with
    /// corrected card details.
    #[error(transparent)]
    PaymentRejected(#[from] PaymentRejection),

    /// Order placement was rejected or unreachable. Terminal for this
    /// attempt; the cart is left untouched so the selection is not lost.
    #[error("order placement failed: {0}")]
    OrderPlacementFailed(#[from] GatewayError),
}
