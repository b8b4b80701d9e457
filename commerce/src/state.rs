//! Commerce state types.
//!
//! All types are `Clone` values: the store hands out whole snapshots, and
//! orchestrators roll back by restoring a previously captured snapshot.

use booklane_gateway::{CartItem, Product, ProductId};
use serde::{Deserialize, Serialize};

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product this line refers to
    pub product_id: ProductId,
    /// Units in the cart, always >= 1 while the line exists
    pub quantity: u32,
    /// Unit price in minor currency units
    pub unit_price: u64,
}

impl CartLine {
    /// Line total in minor currency units.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.unit_price * self.quantity as u64
    }
}

/// Ordered collection of cart lines, at most one per product.
///
/// The backend is the durable owner; this is a cached, possibly-stale
/// copy. Line order is insertion order and is preserved across patches,
/// so repeat adds do not reshuffle the cart view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// All lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    /// Quantity for a product; 0 when absent.
    #[must_use]
    pub fn quantity(&self, product_id: &ProductId) -> u32 {
        self.line(product_id).map_or(0, |line| line.quantity)
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line totals, in minor currency units.
    #[must_use]
    pub fn subtotal(&self) -> u64 {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// Apply a quantity delta for a product.
    ///
    /// A positive delta on an absent product creates the line with
    /// `unit_price`; on a present line it adjusts the quantity in place
    /// (`unit_price` is ignored - the line keeps the price it was created
    /// with until reconciliation replaces it). A quantity driven to zero
    /// or below removes the line.
    pub fn apply_delta(&mut self, product_id: &ProductId, delta: i64, unit_price: u64) {
        match self.lines.iter().position(|line| &line.product_id == product_id) {
            Some(index) => {
                let next = i64::from(self.lines[index].quantity) + delta;
                if next <= 0 {
                    self.lines.remove(index);
                } else {
                    // Bounded by the i64 check above; carts never approach u32::MAX.
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    {
                        self.lines[index].quantity = next as u32;
                    }
                }
            },
            None => {
                if delta > 0 {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    self.lines.push(CartLine {
                        product_id: product_id.clone(),
                        quantity: delta as u32,
                        unit_price,
                    });
                }
            },
        }
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            let unit_price = item.unit_price();
            cart.apply_delta(&item.book.id, i64::from(item.quantity), unit_price);
        }
        cart
    }
}

/// Set of wishlisted products, presence only, insertion-ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    entries: Vec<ProductId>,
}

impl Wishlist {
    /// Empty wishlist.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// All entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[ProductId] {
        &self.entries
    }

    /// Whether a product is wishlisted.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.entries.contains(product_id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the wishlist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set presence for a product. Inserting an already-present product or
    /// removing an absent one is a no-op, keeping the set invariant.
    pub fn set_present(&mut self, product_id: &ProductId, present: bool) {
        if present {
            if !self.contains(product_id) {
                self.entries.push(product_id.clone());
            }
        } else {
            self.entries.retain(|entry| entry != product_id);
        }
    }
}

impl From<Vec<Product>> for Wishlist {
    fn from(products: Vec<Product>) -> Self {
        let mut wishlist = Self::new();
        for product in products {
            wishlist.set_present(&product.id, true);
        }
        wishlist
    }
}

/// Session-scoped commerce state: the cart and wishlist caches plus their
/// hydration flags. Rebuilt lazily from the backend - each collection is
/// fetched the first time it is read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommerceState {
    /// Cached cart
    pub cart: Cart,
    /// Cached wishlist
    pub wishlist: Wishlist,
    /// Whether the cart cache has been hydrated from the backend
    pub cart_loaded: bool,
    /// Whether the wishlist cache has been hydrated from the backend
    pub wishlist_loaded: bool,
}
