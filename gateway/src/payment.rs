//! Payment collaborator interface.
//!
//! The payment processor is opaque and untrusted: it accepts card input
//! plus billing details and returns either an opaque payment-method
//! reference or a structured rejection. A rejected creation is never
//! retried automatically - the user must re-confirm with corrected card
//! details.

use std::future::Future;
use thiserror::Error;

/// Opaque payment-method reference returned by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethodRef(pub String);

impl std::fmt::Display for PaymentMethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw card input collected by the card field.
///
/// Held only for the duration of a single `create_payment_method` call and
/// never logged or stored.
#[derive(Debug, Clone)]
pub struct CardDetails {
    /// Primary account number
    pub number: String,
    /// Expiry month (1-12)
    pub exp_month: u8,
    /// Expiry year, four digits
    pub exp_year: u16,
    /// Card verification code
    pub cvc: String,
}

/// Billing details attached to the payment method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingDetails {
    /// Cardholder name
    pub name: String,
    /// Billing email
    pub email: String,
    /// Street address line
    pub line1: String,
    /// City
    pub city: String,
    /// Postal code
    pub postal_code: String,
    /// Country
    pub country: String,
}

/// Structured rejection from the payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payment rejected: {message}")]
pub struct PaymentRejection {
    /// Processor-specific decline code, when one was given
    pub code: Option<String>,
    /// Human-readable rejection reason
    pub message: String,
}

impl PaymentRejection {
    /// Rejection with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

/// The external payment SDK.
pub trait PaymentProvider: Send + Sync {
    /// Whether the SDK has finished initializing. Checkout must not
    /// attempt payment-method creation before this reports `true`.
    fn is_ready(&self) -> bool;

    /// Create an opaque payment-method reference from card input.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentRejection`] when the card is declined or the SDK
    /// reports an error.
    fn create_payment_method(
        &self,
        card: &CardDetails,
        billing: &BillingDetails,
    ) -> impl Future<Output = Result<PaymentMethodRef, PaymentRejection>> + Send;
}
