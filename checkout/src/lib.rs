//! # Booklane Checkout
//!
//! Checkout state machine for the Booklane client.
//!
//! A checkout session sequences three steps with partial-failure risk:
//! synchronous form validation, payment-method creation against the
//! external payment SDK, and order placement against the commerce
//! backend.
//!
//! ```text
//! Idle → Validating → CreatingPaymentMethod → PlacingOrder → Succeeded
//!             │                 │                  │
//!             ▼                 ▼                  ▼
//!       back to Idle     Failed("payment-   Failed("order", …)
//!       (field errors)   method"/"payment-
//!                        sdk", …)
//! ```
//!
//! The machine operates on a cart snapshot frozen at entry - concurrent
//! cart edits elsewhere cannot change the totals mid-checkout - and it
//! never mutates the commerce store. Every failure leaves the form
//! editable and the cart untouched, so the user can correct input and
//! resubmit; a resubmission re-enters `Validating` from the current form
//! state and reuses the session's idempotency key, so a retry after a
//! placement failure cannot double-charge.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod form;
pub mod machine;

pub use error::CheckoutError;
pub use form::{CheckoutForm, FormField};
pub use machine::{CheckoutMachine, CheckoutStage, FailureStage, Totals};
