//! Action orchestrators.
//!
//! Every mutation follows the same transaction shape:
//!
//! 1. require a session credential (no network call without one)
//! 2. acquire the per-entity mutation lock, failing fast on overlap
//! 3. snapshot the store and apply the optimistic patch
//! 4. issue the remote call
//! 5. on success reconcile with the authoritative payload; on failure
//!    restore the snapshot
//! 6. release the lock - by permit drop, on every path
//!
//! The store is mutated exclusively via dispatch, never in place, so a
//! concurrently scheduled handler that reads state at use time always
//! observes a consistent value.

use crate::actions::CommerceAction;
use crate::error::{CommerceError, Result};
use crate::reducer::CommerceReducer;
use crate::session::{Credential, CredentialStore, SessionContext};
use crate::state::{Cart, Wishlist};
use booklane_core::guard::MutationGuard;
use booklane_core::store::{Store, Subscription};
use booklane_gateway::{CommerceGateway, Product, ProductId, UserProfile};

/// The commerce store: shared session-scoped cart/wishlist state.
pub type CommerceStore = Store<CommerceReducer>;

/// Entity addressed by the mutation guard.
///
/// Cart and wishlist mutations on the same product are independent
/// entities; two cart mutations on the same product conflict.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    /// A cart line
    Cart(ProductId),
    /// A wishlist entry
    Wishlist(ProductId),
}

/// Injected dependencies for the orchestrators.
#[derive(Debug, Clone)]
pub struct CommerceEnvironment<G, C>
where
    G: CommerceGateway,
    C: CredentialStore,
{
    /// Remote commerce backend
    pub gateway: G,
    /// Explicit session context over the credential store
    pub session: SessionContext<C>,
}

impl<G, C> CommerceEnvironment<G, C>
where
    G: CommerceGateway,
    C: CredentialStore,
{
    /// Build an environment from a gateway and a credential store.
    pub const fn new(gateway: G, credentials: C) -> Self {
        Self {
            gateway,
            session: SessionContext::new(credentials),
        }
    }
}

/// Orchestrates user commerce actions against the store and the backend.
///
/// Created at session start and torn down at logout; consumers receive it
/// by reference (or behind an `Arc`) rather than through a global.
pub struct CommerceService<G, C>
where
    G: CommerceGateway,
    C: CredentialStore,
{
    store: CommerceStore,
    guard: MutationGuard<EntityKey>,
    env: CommerceEnvironment<G, C>,
}

impl<G, C> CommerceService<G, C>
where
    G: CommerceGateway,
    C: CredentialStore,
{
    /// Create a service with a fresh, unhydrated store.
    #[must_use]
    pub fn new(env: CommerceEnvironment<G, C>) -> Self {
        Self {
            store: Store::new(crate::state::CommerceState::default(), CommerceReducer),
            guard: MutationGuard::new(),
            env,
        }
    }

    /// Handle to the shared store, e.g. for the navigation badge.
    #[must_use]
    pub const fn store(&self) -> &CommerceStore {
        &self.store
    }

    /// Session context for credential queries.
    #[must_use]
    pub const fn session(&self) -> &SessionContext<C> {
        &self.env.session
    }

    /// Subscribe to state changes. See [`Store::subscribe`].
    #[must_use]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&crate::state::CommerceState) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    /// Whether a mutation for the given entity is currently in flight,
    /// e.g. to keep the triggering control disabled.
    #[must_use]
    pub fn is_mutating(&self, key: &EntityKey) -> bool {
        self.guard.is_held(key)
    }

    /// Exchange credentials for a session and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NetworkOrServerError`] when the backend
    /// rejects the credentials or is unreachable.
    #[tracing::instrument(skip_all, fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let response = self.env.gateway.login(email, password).await?;
        let user = response.user.clone();
        self.env.session.establish(Credential {
            token: response.token,
            user: response.user,
        });
        Ok(user)
    }

    /// End the session: clear the stored credential and tear down the
    /// store. Consuming `self` makes the lifecycle explicit - a new
    /// service (with an empty cache) is created at next login.
    pub fn logout(self) {
        self.env.session.clear();
        tracing::info!("session ended");
    }

    /// Fetch the full catalog. Unauthenticated; not cached in the store -
    /// listing views derive their display from this snapshot via
    /// [`crate::catalog::filter`].
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NetworkOrServerError`] on gateway failure.
    pub async fn catalog(&self) -> Result<Vec<Product>> {
        Ok(self.env.gateway.list_catalog().await?)
    }

    /// Current cart, hydrating the cache from the backend on first read.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Unauthenticated`] without a session, or
    /// [`CommerceError::NetworkOrServerError`] if hydration fails.
    pub async fn cart(&self) -> Result<Cart> {
        let token = self.env.session.bearer()?;
        self.ensure_cart(&token).await?;
        Ok(self.store.with_state(|state| state.cart.clone()))
    }

    /// Current wishlist, hydrating the cache from the backend on first
    /// read.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Unauthenticated`] without a session, or
    /// [`CommerceError::NetworkOrServerError`] if hydration fails.
    pub async fn wishlist(&self) -> Result<Wishlist> {
        let token = self.env.session.bearer()?;
        self.ensure_wishlist(&token).await?;
        Ok(self.store.with_state(|state| state.wishlist.clone()))
    }

    /// Add one unit of a product to the cart.
    ///
    /// Optimistically creates or increments the line, then reconciles with
    /// the authoritative cart. Two sequential calls for the same product
    /// increase its quantity by exactly two; an overlapping call fails
    /// fast without issuing a second request.
    ///
    /// # Errors
    ///
    /// [`CommerceError::Unauthenticated`], [`CommerceError::AlreadyInFlight`],
    /// or [`CommerceError::NetworkOrServerError`] after rollback.
    #[tracing::instrument(skip_all, fields(product = %product.id))]
    pub async fn add_to_cart(&self, product: &Product) -> Result<()> {
        let token = self.env.session.bearer()?;
        let _permit = self.guard.acquire(EntityKey::Cart(product.id.clone()))?;

        self.ensure_cart(&token).await?;
        let snapshot = self.store.state();
        self.store.dispatch(CommerceAction::PatchCartLine {
            product_id: product.id.clone(),
            delta: 1,
            unit_price: product.price.current,
        });

        match self.env.gateway.add_to_cart(&token, &product.id, 1).await {
            Ok(()) => {
                self.reconcile_cart(&token).await;
                Ok(())
            },
            Err(error) => {
                tracing::warn!(%error, "add to cart failed, rolling back");
                self.store.dispatch(CommerceAction::SetCart(snapshot.cart));
                Err(CommerceError::NetworkOrServerError(error))
            },
        }
    }

    /// Set the quantity of an existing cart line; 0 removes the line.
    ///
    /// A product with no cart line is left untouched.
    ///
    /// # Errors
    ///
    /// [`CommerceError::Unauthenticated`], [`CommerceError::AlreadyInFlight`],
    /// or [`CommerceError::NetworkOrServerError`] after rollback.
    #[tracing::instrument(skip_all, fields(product = %product_id, quantity = quantity))]
    pub async fn update_cart_quantity(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let token = self.env.session.bearer()?;
        let _permit = self.guard.acquire(EntityKey::Cart(product_id.clone()))?;

        self.ensure_cart(&token).await?;
        let snapshot = self.store.state();
        let Some(line) = snapshot.cart.line(product_id) else {
            return Ok(());
        };

        self.store.dispatch(CommerceAction::PatchCartLine {
            product_id: product_id.clone(),
            delta: i64::from(quantity) - i64::from(line.quantity),
            unit_price: line.unit_price,
        });

        let outcome = if quantity == 0 {
            self.env.gateway.remove_cart_line(&token, product_id).await
        } else {
            self.env
                .gateway
                .update_cart_line(&token, product_id, quantity)
                .await
        };

        match outcome {
            Ok(()) => {
                self.reconcile_cart(&token).await;
                Ok(())
            },
            Err(error) => {
                tracing::warn!(%error, "cart update failed, rolling back");
                self.store.dispatch(CommerceAction::SetCart(snapshot.cart));
                Err(CommerceError::NetworkOrServerError(error))
            },
        }
    }

    /// Remove a cart line entirely.
    ///
    /// # Errors
    ///
    /// [`CommerceError::Unauthenticated`], [`CommerceError::AlreadyInFlight`],
    /// or [`CommerceError::NetworkOrServerError`] after rollback.
    #[tracing::instrument(skip_all, fields(product = %product_id))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<()> {
        let token = self.env.session.bearer()?;
        let _permit = self.guard.acquire(EntityKey::Cart(product_id.clone()))?;

        self.ensure_cart(&token).await?;
        let snapshot = self.store.state();
        let quantity = snapshot.cart.quantity(product_id);

        self.store.dispatch(CommerceAction::PatchCartLine {
            product_id: product_id.clone(),
            delta: -i64::from(quantity),
            unit_price: 0,
        });

        match self.env.gateway.remove_cart_line(&token, product_id).await {
            Ok(()) => {
                self.reconcile_cart(&token).await;
                Ok(())
            },
            Err(error) => {
                tracing::warn!(%error, "cart removal failed, rolling back");
                self.store.dispatch(CommerceAction::SetCart(snapshot.cart));
                Err(CommerceError::NetworkOrServerError(error))
            },
        }
    }

    /// Toggle a product's wishlist membership. Returns the new presence.
    ///
    /// Toggling twice in sequence returns the entry to its original
    /// presence.
    ///
    /// # Errors
    ///
    /// [`CommerceError::Unauthenticated`], [`CommerceError::AlreadyInFlight`],
    /// or [`CommerceError::NetworkOrServerError`] after rollback.
    #[tracing::instrument(skip_all, fields(product = %product_id))]
    pub async fn toggle_wishlist(&self, product_id: &ProductId) -> Result<bool> {
        let token = self.env.session.bearer()?;
        let _permit = self
            .guard
            .acquire(EntityKey::Wishlist(product_id.clone()))?;

        self.ensure_wishlist(&token).await?;
        let snapshot = self.store.state();
        let present = snapshot.wishlist.contains(product_id);

        self.store.dispatch(CommerceAction::PatchWishlist {
            product_id: product_id.clone(),
            present: !present,
        });

        let outcome = if present {
            self.env
                .gateway
                .remove_from_wishlist(&token, product_id)
                .await
        } else {
            self.env.gateway.add_to_wishlist(&token, product_id).await
        };

        match outcome {
            Ok(()) => {
                self.reconcile_wishlist(&token).await;
                Ok(!present)
            },
            Err(error) => {
                tracing::warn!(%error, "wishlist toggle failed, rolling back");
                self.store
                    .dispatch(CommerceAction::SetWishlist(snapshot.wishlist));
                Err(CommerceError::NetworkOrServerError(error))
            },
        }
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// [`CommerceError::Unauthenticated`], [`CommerceError::AlreadyInFlight`],
    /// or [`CommerceError::NetworkOrServerError`] after rollback.
    #[tracing::instrument(skip_all, fields(product = %product_id))]
    pub async fn remove_from_wishlist(&self, product_id: &ProductId) -> Result<()> {
        let token = self.env.session.bearer()?;
        let _permit = self
            .guard
            .acquire(EntityKey::Wishlist(product_id.clone()))?;

        self.ensure_wishlist(&token).await?;
        let snapshot = self.store.state();

        self.store.dispatch(CommerceAction::PatchWishlist {
            product_id: product_id.clone(),
            present: false,
        });

        match self
            .env
            .gateway
            .remove_from_wishlist(&token, product_id)
            .await
        {
            Ok(()) => {
                self.reconcile_wishlist(&token).await;
                Ok(())
            },
            Err(error) => {
                tracing::warn!(%error, "wishlist removal failed, rolling back");
                self.store
                    .dispatch(CommerceAction::SetWishlist(snapshot.wishlist));
                Err(CommerceError::NetworkOrServerError(error))
            },
        }
    }

    async fn ensure_cart(&self, token: &str) -> Result<()> {
        if self.store.with_state(|state| state.cart_loaded) {
            return Ok(());
        }
        let items = self.env.gateway.fetch_cart(token).await?;
        self.store.dispatch(CommerceAction::SetCart(Cart::from(items)));
        Ok(())
    }

    async fn ensure_wishlist(&self, token: &str) -> Result<()> {
        if self.store.with_state(|state| state.wishlist_loaded) {
            return Ok(());
        }
        let products = self.env.gateway.fetch_wishlist(token).await?;
        self.store
            .dispatch(CommerceAction::SetWishlist(Wishlist::from(products)));
        Ok(())
    }

    /// Replace the local cart with the authoritative copy after a
    /// successful mutation. The mutation itself already succeeded, so a
    /// failed refresh keeps the optimistic state; a later read re-syncs.
    async fn reconcile_cart(&self, token: &str) {
        match self.env.gateway.fetch_cart(token).await {
            Ok(items) => {
                self.store.dispatch(CommerceAction::SetCart(Cart::from(items)));
            },
            Err(error) => {
                tracing::warn!(%error, "cart refresh failed, keeping optimistic state");
            },
        }
    }

    async fn reconcile_wishlist(&self, token: &str) {
        match self.env.gateway.fetch_wishlist(token).await {
            Ok(products) => {
                self.store
                    .dispatch(CommerceAction::SetWishlist(Wishlist::from(products)));
            },
            Err(error) => {
                tracing::warn!(%error, "wishlist refresh failed, keeping optimistic state");
            },
        }
    }
}
