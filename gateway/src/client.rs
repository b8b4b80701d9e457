//! Commerce backend client implementation.

use crate::error::GatewayError;
use crate::types::{
    AddCartRequest, CartItem, CartPayload, CatalogPayload, LoginRequest, LoginResponse,
    OrderRequest, Product, ProductId, UpdateCartRequest, WishlistPayload,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::future::Future;
use std::time::Duration;

/// Default deadline for every request to the backend. An unanswered
/// mutation would otherwise leave its entity locked for as long as the
/// transport cares to wait.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Interface to the remote commerce backend.
///
/// The backend is the authoritative writer of record for cart, wishlist,
/// and orders; callers optimistically predict its effects and reconcile
/// with the payloads these methods return. All authenticated operations
/// take the bearer credential explicitly - the gateway holds no session
/// state of its own.
pub trait CommerceGateway: Send + Sync {
    /// Fetch the full catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, timeout, or a
    /// non-2xx response.
    fn list_catalog(&self) -> impl Future<Output = Result<Vec<Product>, GatewayError>> + Send;

    /// Fetch the authoritative cart contents.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, timeout,
    /// `Unauthorized`, or a non-2xx response.
    fn fetch_cart(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<CartItem>, GatewayError>> + Send;

    /// Add `quantity` units of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, timeout,
    /// `Unauthorized`, or a non-2xx response.
    fn add_to_cart(
        &self,
        token: &str,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Replace the quantity of an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, timeout,
    /// `Unauthorized`, or a non-2xx response.
    fn update_cart_line(
        &self,
        token: &str,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Remove a cart line entirely.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, timeout,
    /// `Unauthorized`, or a non-2xx response.
    fn remove_cart_line(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Fetch the authoritative wishlist contents.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, timeout,
    /// `Unauthorized`, or a non-2xx response.
    fn fetch_wishlist(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<Product>, GatewayError>> + Send;

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, timeout,
    /// `Unauthorized`, or a non-2xx response.
    fn add_to_wishlist(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, timeout,
    /// `Unauthorized`, or a non-2xx response.
    fn remove_from_wishlist(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, timeout,
    /// `Unauthorized`, or a non-2xx response.
    fn place_order(
        &self,
        token: &str,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Exchange credentials for a bearer token and user profile.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, timeout, or when
    /// the backend rejects the credentials.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse, GatewayError>> + Send;
}

/// REST implementation of [`CommerceGateway`].
#[derive(Debug, Clone)]
pub struct HttpCommerceGateway {
    client: Client,
    base_url: String,
}

impl HttpCommerceGateway {
    /// Create a gateway with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::RequestFailed` if the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a gateway with an explicit per-request deadline.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::RequestFailed` if the HTTP client cannot be
    /// constructed.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn expect_ok(request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = request.send().await.map_err(|e| GatewayError::transport(&e))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(GatewayError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(GatewayError::ApiError {
                    status: status.as_u16(),
                    message: body,
                })
            },
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::ResponseParseFailed(e.to_string()))
    }
}

impl CommerceGateway for HttpCommerceGateway {
    fn list_catalog(&self) -> impl Future<Output = Result<Vec<Product>, GatewayError>> + Send {
        async move {
            let request = self.client.get(self.url("/api/books/getAllBooks"));
            let payload: CatalogPayload = Self::parse(Self::expect_ok(request).await?).await?;
            Ok(payload.data)
        }
    }

    fn fetch_cart(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<CartItem>, GatewayError>> + Send {
        async move {
            let request = self.client.get(self.url("/api/cart")).bearer_auth(token);
            let payload: CartPayload = Self::parse(Self::expect_ok(request).await?).await?;
            Ok(payload.items)
        }
    }

    fn add_to_cart(
        &self,
        token: &str,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            tracing::debug!(product = %product_id, quantity, "add to cart");
            let request = self
                .client
                .post(self.url("/api/cart/add"))
                .bearer_auth(token)
                .json(&AddCartRequest {
                    book_id: product_id,
                    quantity,
                });
            Self::expect_ok(request).await.map(|_| ())
        }
    }

    fn update_cart_line(
        &self,
        token: &str,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            tracing::debug!(product = %product_id, quantity, "update cart line");
            let request = self
                .client
                .put(self.url(&format!("/api/cart/update/{product_id}")))
                .bearer_auth(token)
                .json(&UpdateCartRequest { quantity });
            Self::expect_ok(request).await.map(|_| ())
        }
    }

    fn remove_cart_line(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            tracing::debug!(product = %product_id, "remove cart line");
            let request = self
                .client
                .delete(self.url(&format!("/api/cart/remove/{product_id}")))
                .bearer_auth(token);
            Self::expect_ok(request).await.map(|_| ())
        }
    }

    fn fetch_wishlist(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<Product>, GatewayError>> + Send {
        async move {
            let request = self.client.get(self.url("/api/likes")).bearer_auth(token);
            let payload: WishlistPayload = Self::parse(Self::expect_ok(request).await?).await?;
            Ok(payload.into_products())
        }
    }

    fn add_to_wishlist(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            tracing::debug!(product = %product_id, "add to wishlist");
            let request = self
                .client
                .post(self.url(&format!("/api/likes/{product_id}")))
                .bearer_auth(token);
            Self::expect_ok(request).await.map(|_| ())
        }
    }

    fn remove_from_wishlist(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            tracing::debug!(product = %product_id, "remove from wishlist");
            let request = self
                .client
                .delete(self.url(&format!("/api/likes/{product_id}")))
                .bearer_auth(token);
            Self::expect_ok(request).await.map(|_| ())
        }
    }

    fn place_order(
        &self,
        token: &str,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            tracing::info!(idempotency_key = %order.idempotency_key, "place order");
            let request = self
                .client
                .post(self.url("/api/orders"))
                .bearer_auth(token)
                .json(order);
            Self::expect_ok(request).await.map(|_| ())
        }
    }

    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse, GatewayError>> + Send {
        async move {
            tracing::info!(email, "login");
            let request = self
                .client
                .post(self.url("/api/auth/login"))
                .json(&LoginRequest { email, password });
            Self::parse(Self::expect_ok(request).await?).await
        }
    }
}
