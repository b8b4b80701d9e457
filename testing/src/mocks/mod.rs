//! Mock implementations for testing.

mod credentials;
mod gateway;
mod payment;

pub use credentials::MemoryCredentialStore;
pub use gateway::{GatewayOp, MockCommerceGateway, MutationHold};
pub use payment::MockPaymentProvider;
