//! # Booklane Gateway
//!
//! Client for the remote commerce backend and the payment collaborator.
//!
//! The backend is the durable owner of cart, wishlist, and orders; this
//! crate exposes it as the [`client::CommerceGateway`] trait so the
//! orchestration layer can be written against an interface and tested
//! against an in-memory mock. [`client::HttpCommerceGateway`] is the
//! production implementation over REST.
//!
//! The payment processor is a second, fully opaque collaborator - see
//! [`payment::PaymentProvider`].

pub mod client;
pub mod error;
pub mod payment;
pub mod types;

pub use client::{CommerceGateway, HttpCommerceGateway};
pub use error::GatewayError;
pub use payment::{BillingDetails, CardDetails, PaymentMethodRef, PaymentProvider, PaymentRejection};
pub use types::{
    CartItem, LoginResponse, OrderRequest, Price, Product, ProductId, ShippingAddress, UserProfile,
};
