//! # Booklane Testing
//!
//! Testing utilities and helpers for the Booklane commerce client.
//!
//! This crate provides:
//! - Mock implementations of the gateway, payment, and credential traits
//! - Fixture builders for products, users, and cards
//! - A tracing initializer for test output
//!
//! ## Example
//!
//! ```
//! use booklane_commerce::{CommerceEnvironment, CommerceService};
//! use booklane_testing::fixtures;
//! use booklane_testing::mocks::{MemoryCredentialStore, MockCommerceGateway};
//!
//! # async fn example() {
//! let gateway = MockCommerceGateway::new();
//! gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
//!
//! let service = CommerceService::new(CommerceEnvironment::new(
//!     gateway.clone(),
//!     MemoryCredentialStore::authenticated(),
//! ));
//! let cart = service.cart().await.unwrap();
//! assert!(cart.is_empty());
//! # }
//! ```

pub mod fixtures;
pub mod mocks;

pub use mocks::{GatewayOp, MemoryCredentialStore, MockCommerceGateway, MockPaymentProvider};

/// Initialize tracing for a test binary, reading `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs the
/// subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
