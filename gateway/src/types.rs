//! Wire types for the commerce backend.
//!
//! Field names follow the backend's JSON (camelCase, `_id` keys); amounts
//! are integer minor units throughout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque product identifier assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    /// Wrap a raw backend identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier, for building request paths.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Price of a product, in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Price {
    /// Current selling price
    pub current: u64,
    /// Pre-discount price
    #[serde(default)]
    pub original: u64,
    /// Discount percentage, 0 when none
    #[serde(default)]
    pub discount: u8,
}

/// Catalog product snapshot.
///
/// Immutable on the client: fetched from the catalog and never mutated
/// locally. Price and stock may drift from what the backend currently
/// holds, which is why cart reconciliation always prefers server truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display title
    pub title: String,
    /// Long-form description, searched by the catalog filter
    #[serde(default)]
    pub description: String,
    /// Category name
    pub category: String,
    /// Price block
    pub price: Price,
    /// Average rating
    #[serde(default)]
    pub rating: f32,
    /// Units in stock
    #[serde(default)]
    pub stock: u32,
    /// Cover image URL
    #[serde(rename = "coverImage", default)]
    pub cover_image: String,
}

/// One cart line as returned by `GET /api/cart`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartItem {
    /// The product this line refers to
    pub book: Product,
    /// Units in the cart
    pub quantity: u32,
    /// Unit price charged for this line; falls back to the product's
    /// current price when the backend omits it
    #[serde(default)]
    pub price: Option<u64>,
}

impl CartItem {
    /// The unit price the backend charges for this line.
    #[must_use]
    pub fn unit_price(&self) -> u64 {
        self.price.unwrap_or(self.book.price.current)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogPayload {
    pub data: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartPayload {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// The wishlist endpoint has shipped two shapes; both are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WishlistPayload {
    Bare(Vec<Product>),
    Wrapped { wishlist: Vec<Product> },
}

impl WishlistPayload {
    pub(crate) fn into_products(self) -> Vec<Product> {
        match self {
            Self::Bare(products) | Self::Wrapped { wishlist: products } => products,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddCartRequest<'a> {
    pub book_id: &'a ProductId,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateCartRequest {
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Shipping address submitted with an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Street address line
    pub address: String,
    /// City
    pub city: String,
    /// State or region, may be empty
    #[serde(default)]
    pub state: String,
    /// Postal code
    pub zip_code: String,
    /// Country
    pub country: String,
}

/// Order submission payload for `POST /api/orders`.
///
/// The idempotency key is generated client-side once per checkout session
/// and reused on retry, so a resubmission after a failed placement cannot
/// double-charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Where to ship
    pub shipping_address: ShippingAddress,
    /// Opaque payment-method reference from the payment collaborator
    pub payment_method: String,
    /// Client-generated deduplication key, stable across retries
    pub idempotency_key: String,
}

/// User profile returned at login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend identifier
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Account email
    pub email: String,
    /// Account creation time, when the backend provides it
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Successful response from `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    /// Bearer credential for subsequent requests
    pub token: String,
    /// Profile of the authenticated user
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "_id": id,
            "title": "The Pragmatic Programmer",
            "description": "Journeyman to master",
            "category": "Non-Fiction",
            "price": { "current": 450, "original": 500, "discount": 10 },
            "rating": 4.5,
            "stock": 12,
            "coverImage": "https://example.com/pragprog.jpg"
        })
    }

    #[test]
    fn product_parses_backend_field_names() {
        let product: Product = serde_json::from_value(product_json("b1")).expect("product json");
        assert_eq!(product.id, ProductId::from("b1"));
        assert_eq!(product.price.current, 450);
        assert_eq!(product.cover_image, "https://example.com/pragprog.jpg");
    }

    #[test]
    fn cart_item_falls_back_to_product_price() {
        let with_price: CartItem = serde_json::from_value(serde_json::json!({
            "book": product_json("b1"),
            "quantity": 2,
            "price": 400
        }))
        .expect("cart item json");
        assert_eq!(with_price.unit_price(), 400);

        let without_price: CartItem = serde_json::from_value(serde_json::json!({
            "book": product_json("b1"),
            "quantity": 2
        }))
        .expect("cart item json");
        assert_eq!(without_price.unit_price(), 450);
    }

    #[test]
    fn wishlist_payload_accepts_both_shapes() {
        let bare: WishlistPayload =
            serde_json::from_value(serde_json::json!([product_json("b1")])).expect("bare shape");
        assert_eq!(bare.into_products().len(), 1);

        let wrapped: WishlistPayload = serde_json::from_value(serde_json::json!({
            "wishlist": [product_json("b1"), product_json("b2")]
        }))
        .expect("wrapped shape");
        assert_eq!(wrapped.into_products().len(), 2);
    }

    #[test]
    fn order_request_serializes_camel_case() {
        let order = OrderRequest {
            shipping_address: ShippingAddress {
                address: "221B Baker Street".into(),
                city: "London".into(),
                state: String::new(),
                zip_code: "NW1 6XE".into(),
                country: "UK".into(),
            },
            payment_method: "pm_123".into(),
            idempotency_key: "idem-1".into(),
        };
        let value = serde_json::to_value(&order).expect("order json");
        assert_eq!(value["shippingAddress"]["zipCode"], "NW1 6XE");
        assert_eq!(value["paymentMethod"], "pm_123");
        assert_eq!(value["idempotencyKey"], "idem-1");
    }
}
