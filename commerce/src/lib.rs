//! # Booklane Commerce
//!
//! Client-side commerce state synchronization for the Booklane client.
//!
//! This crate keeps a shared in-memory representation of the user's cart
//! and wishlist consistent with the remote backend under concurrent,
//! possibly-failing user actions:
//!
//! - [`state::CommerceState`] + [`reducer::CommerceReducer`] - the single
//!   source of local truth, mutated only through store dispatch
//! - [`service::CommerceService`] - action orchestrators implementing the
//!   optimistic-update-with-rollback transaction: snapshot, apply, attempt
//!   the remote call, restore the snapshot on failure
//! - [`catalog`] - pure derivation of a filtered product list
//! - [`session`] - explicit session context over an abstract credential
//!   store, replacing ambient browser storage
//!
//! ## Data flow
//!
//! ```text
//! UI event → CommerceService → Store (optimistic patch)
//!                            → CommerceGateway (remote call)
//!                            → Store (reconcile or rollback)
//!                            → subscribers re-render
//! ```

// Public modules
pub mod actions;
pub mod catalog;
pub mod error;
pub mod reducer;
pub mod service;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use actions::CommerceAction;
pub use error::{CommerceError, Result};
pub use reducer::CommerceReducer;
pub use service::{CommerceEnvironment, CommerceService, CommerceStore, EntityKey};
pub use session::{Credential, CredentialStore, SessionContext};
pub use state::{Cart, CartLine, CommerceState, Wishlist};
