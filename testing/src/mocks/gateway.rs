//! Scriptable in-memory commerce backend.

use crate::fixtures;
use booklane_gateway::{
    CartItem, CommerceGateway, GatewayError, LoginResponse, OrderRequest, Product, ProductId,
};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

/// Operations the mock records, keyed for request counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    /// `GET /api/books/getAllBooks`
    Catalog,
    /// `GET /api/cart`
    FetchCart,
    /// `POST /api/cart/add`
    AddToCart,
    /// `PUT /api/cart/update/:id`
    UpdateCart,
    /// `DELETE /api/cart/remove/:id`
    RemoveCart,
    /// `GET /api/likes`
    FetchWishlist,
    /// `POST /api/likes/:id`
    AddWishlist,
    /// `DELETE /api/likes/:id`
    RemoveWishlist,
    /// `POST /api/orders`
    PlaceOrder,
    /// `POST /api/auth/login`
    Login,
}

#[derive(Debug, Default)]
struct BackendState {
    catalog: Vec<Product>,
    cart: Vec<(ProductId, u32)>,
    wishlist: Vec<ProductId>,
    orders: Vec<OrderRequest>,
    counts: HashMap<GatewayOp, usize>,
    failures: HashMap<GatewayOp, VecDeque<GatewayError>>,
}

impl BackendState {
    fn product(&self, product_id: &ProductId) -> Product {
        self.catalog
            .iter()
            .find(|product| &product.id == product_id)
            .cloned()
            .unwrap_or_else(|| fixtures::product(product_id.as_str(), "Unknown", 0, 0.0))
    }
}

/// In-memory stand-in for the remote commerce backend.
///
/// Holds authoritative cart/wishlist state that mutations actually change,
/// so reconciliation fetches observe server truth exactly like they would
/// in production. Individual operations can be scripted to fail once, and
/// mutations can be held open to exercise overlap handling.
#[derive(Debug, Clone)]
pub struct MockCommerceGateway {
    state: Arc<Mutex<BackendState>>,
    hold_tx: watch::Sender<bool>,
}

impl MockCommerceGateway {
    /// Empty backend.
    #[must_use]
    pub fn new() -> Self {
        let (hold_tx, _) = watch::channel(false);
        Self {
            state: Arc::new(Mutex::new(BackendState::default())),
            hold_tx,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed the catalog products the backend knows about.
    pub fn seed_catalog(&self, products: Vec<Product>) {
        self.lock().catalog = products;
    }

    /// Seed an existing cart line.
    pub fn seed_cart_line(&self, product_id: &ProductId, quantity: u32) {
        self.lock().cart.push((product_id.clone(), quantity));
    }

    /// Seed an existing wishlist entry.
    pub fn seed_wishlist(&self, product_id: &ProductId) {
        self.lock().wishlist.push(product_id.clone());
    }

    /// Script the next call to `op` to fail with `error`.
    pub fn fail_next(&self, op: GatewayOp, error: GatewayError) {
        self.lock().failures.entry(op).or_default().push_back(error);
    }

    /// Number of requests issued for `op`.
    #[must_use]
    pub fn request_count(&self, op: GatewayOp) -> usize {
        self.lock().counts.get(&op).copied().unwrap_or(0)
    }

    /// Orders the backend has accepted, in submission order.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.lock().orders.clone()
    }

    /// Current backend cart quantity for a product.
    #[must_use]
    pub fn backend_quantity(&self, product_id: &ProductId) -> u32 {
        self.lock()
            .cart
            .iter()
            .find(|(id, _)| id == product_id)
            .map_or(0, |(_, quantity)| *quantity)
    }

    /// Hold every mutating operation open until the returned guard is
    /// released (or dropped). Read operations are unaffected.
    #[must_use]
    pub fn hold_mutations(&self) -> MutationHold {
        // send_replace updates the value even with no receiver subscribed
        // yet; the gated operations subscribe on entry.
        self.hold_tx.send_replace(true);
        MutationHold {
            hold: self.hold_tx.clone(),
        }
    }

    fn begin(&self, op: GatewayOp) -> Result<(), GatewayError> {
        let mut state = self.lock();
        *state.counts.entry(op).or_default() += 1;
        if let Some(error) = state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(error);
        }
        Ok(())
    }

    async fn gate(&self) {
        let mut rx = self.hold_tx.subscribe();
        while *rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

impl Default for MockCommerceGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard keeping mock mutations suspended; releases on drop.
#[derive(Debug)]
pub struct MutationHold {
    hold: watch::Sender<bool>,
}

impl MutationHold {
    /// Let held mutations proceed.
    pub fn release(self) {}
}

impl Drop for MutationHold {
    fn drop(&mut self) {
        self.hold.send_replace(false);
    }
}

impl CommerceGateway for MockCommerceGateway {
    fn list_catalog(&self) -> impl Future<Output = Result<Vec<Product>, GatewayError>> + Send {
        async move {
            self.begin(GatewayOp::Catalog)?;
            Ok(self.lock().catalog.clone())
        }
    }

    fn fetch_cart(
        &self,
        _token: &str,
    ) -> impl Future<Output = Result<Vec<CartItem>, GatewayError>> + Send {
        async move {
            self.begin(GatewayOp::FetchCart)?;
            let state = self.lock();
            Ok(state
                .cart
                .iter()
                .map(|(product_id, quantity)| {
                    let book = state.product(product_id);
                    let price = Some(book.price.current);
                    CartItem {
                        book,
                        quantity: *quantity,
                        price,
                    }
                })
                .collect())
        }
    }

    fn add_to_cart(
        &self,
        _token: &str,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            self.begin(GatewayOp::AddToCart)?;
            self.gate().await;
            let mut state = self.lock();
            if let Some(index) = state.cart.iter().position(|(id, _)| id == product_id) {
                state.cart[index].1 += quantity;
            } else {
                state.cart.push((product_id.clone(), quantity));
            }
            Ok(())
        }
    }

    fn update_cart_line(
        &self,
        _token: &str,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            self.begin(GatewayOp::UpdateCart)?;
            self.gate().await;
            let mut state = self.lock();
            if let Some((_, existing)) = state.cart.iter_mut().find(|(id, _)| id == product_id) {
                *existing = quantity;
            }
            Ok(())
        }
    }

    fn remove_cart_line(
        &self,
        _token: &str,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            self.begin(GatewayOp::RemoveCart)?;
            self.gate().await;
            self.lock().cart.retain(|(id, _)| id != product_id);
            Ok(())
        }
    }

    fn fetch_wishlist(
        &self,
        _token: &str,
    ) -> impl Future<Output = Result<Vec<Product>, GatewayError>> + Send {
        async move {
            self.begin(GatewayOp::FetchWishlist)?;
            let state = self.lock();
            Ok(state
                .wishlist
                .iter()
                .map(|product_id| state.product(product_id))
                .collect())
        }
    }

    fn add_to_wishlist(
        &self,
        _token: &str,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            self.begin(GatewayOp::AddWishlist)?;
            self.gate().await;
            let mut state = self.lock();
            if !state.wishlist.contains(product_id) {
                state.wishlist.push(product_id.clone());
            }
            Ok(())
        }
    }

    fn remove_from_wishlist(
        &self,
        _token: &str,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            self.begin(GatewayOp::RemoveWishlist)?;
            self.gate().await;
            self.lock().wishlist.retain(|id| id != product_id);
            Ok(())
        }
    }

    fn place_order(
        &self,
        _token: &str,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            self.begin(GatewayOp::PlaceOrder)?;
            self.gate().await;
            self.lock().orders.push(order.clone());
            Ok(())
        }
    }

    fn login(
        &self,
        email: &str,
        _password: &str,
    ) -> impl Future<Output = Result<LoginResponse, GatewayError>> + Send {
        async move {
            self.begin(GatewayOp::Login)?;
            Ok(LoginResponse {
                token: "mock-token".to_owned(),
                user: fixtures::user(email),
            })
        }
    }
}
