//! End-to-end tests for the action orchestrators against the mock backend.

use booklane_commerce::{
    CommerceEnvironment, CommerceError, CommerceService, EntityKey,
};
use booklane_gateway::{GatewayError, ProductId};
use booklane_testing::fixtures;
use booklane_testing::mocks::{GatewayOp, MemoryCredentialStore, MockCommerceGateway};
use std::sync::Arc;
use std::time::Duration;

type Service = CommerceService<MockCommerceGateway, MemoryCredentialStore>;

fn service(gateway: &MockCommerceGateway) -> Service {
    booklane_testing::init_tracing();
    CommerceService::new(CommerceEnvironment::new(
        gateway.clone(),
        MemoryCredentialStore::authenticated(),
    ))
}

fn pid(id: &str) -> ProductId {
    ProductId::from(id)
}

#[tokio::test]
async fn sequential_adds_accumulate_exactly() {
    let gateway = MockCommerceGateway::new();
    gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
    let service = service(&gateway);
    let product = fixtures::product("b1", "Fiction", 450, 4.5);

    for _ in 0..3 {
        service.add_to_cart(&product).await.expect("add");
    }

    let cart = service.cart().await.expect("cart");
    assert_eq!(cart.quantity(&pid("b1")), 3);
    assert_eq!(gateway.backend_quantity(&pid("b1")), 3);
    assert_eq!(gateway.request_count(GatewayOp::AddToCart), 3);
}

#[tokio::test]
async fn overlapping_add_issues_a_single_request() {
    let gateway = MockCommerceGateway::new();
    gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
    let service = Arc::new(service(&gateway));
    let product = fixtures::product("b1", "Fiction", 450, 4.5);

    let hold = gateway.hold_mutations();

    let first = {
        let service = Arc::clone(&service);
        let product = product.clone();
        tokio::spawn(async move { service.add_to_cart(&product).await })
    };

    // Wait until the first call is parked inside the gateway.
    while gateway.request_count(GatewayOp::AddToCart) == 0 {
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert!(service.is_mutating(&EntityKey::Cart(pid("b1"))));

    // The second invocation fails fast: no duplicate request is sent.
    let second = service.add_to_cart(&product).await;
    assert!(matches!(second, Err(CommerceError::AlreadyInFlight)));

    hold.release();
    first.await.expect("join").expect("first add");

    assert_eq!(gateway.request_count(GatewayOp::AddToCart), 1);
    assert_eq!(service.cart().await.expect("cart").quantity(&pid("b1")), 1);
    assert!(!service.is_mutating(&EntityKey::Cart(pid("b1"))));
}

#[tokio::test]
async fn failed_add_restores_the_snapshot_and_releases_the_lock() {
    let gateway = MockCommerceGateway::new();
    gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
    let service = service(&gateway);
    let product = fixtures::product("b1", "Fiction", 450, 4.5);

    let before = service.cart().await.expect("cart");
    gateway.fail_next(
        GatewayOp::AddToCart,
        GatewayError::ApiError {
            status: 500,
            message: "backend down".to_owned(),
        },
    );

    let error = service.add_to_cart(&product).await.expect_err("should fail");
    assert!(matches!(error, CommerceError::NetworkOrServerError(_)));

    assert_eq!(service.cart().await.expect("cart"), before);
    assert!(!service.is_mutating(&EntityKey::Cart(pid("b1"))));

    // The entity is addable again once the failure settles.
    service.add_to_cart(&product).await.expect("retry");
    assert_eq!(service.cart().await.expect("cart").quantity(&pid("b1")), 1);
}

#[tokio::test]
async fn timeout_takes_the_rollback_path() {
    let gateway = MockCommerceGateway::new();
    gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
    let service = service(&gateway);
    let product = fixtures::product("b1", "Fiction", 450, 4.5);

    gateway.fail_next(GatewayOp::AddToCart, GatewayError::Timeout);
    let error = service.add_to_cart(&product).await.expect_err("timeout");

    assert!(matches!(
        error,
        CommerceError::NetworkOrServerError(GatewayError::Timeout)
    ));
    assert!(service.cart().await.expect("cart").is_empty());
    assert!(!service.is_mutating(&EntityKey::Cart(pid("b1"))));
}

#[tokio::test]
async fn unauthenticated_action_makes_no_network_call() {
    let gateway = MockCommerceGateway::new();
    let service: Service = CommerceService::new(CommerceEnvironment::new(
        gateway.clone(),
        MemoryCredentialStore::new(),
    ));
    let product = fixtures::product("b1", "Fiction", 450, 4.5);

    let error = service.add_to_cart(&product).await.expect_err("no session");
    assert!(matches!(error, CommerceError::Unauthenticated));
    assert_eq!(gateway.request_count(GatewayOp::AddToCart), 0);
    assert_eq!(gateway.request_count(GatewayOp::FetchCart), 0);
}

#[tokio::test]
async fn reconciliation_prefers_server_truth_over_the_optimistic_guess() {
    let gateway = MockCommerceGateway::new();
    // The backend knows a newer price than the client's product snapshot.
    gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
    let service = service(&gateway);
    let stale_snapshot = fixtures::product("b1", "Fiction", 999, 4.5);

    service.add_to_cart(&stale_snapshot).await.expect("add");

    let cart = service.cart().await.expect("cart");
    let line = cart.line(&pid("b1")).expect("line");
    assert_eq!(line.unit_price, 450);
}

#[tokio::test]
async fn update_cart_quantity_reconciles_and_zero_removes() {
    let gateway = MockCommerceGateway::new();
    gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
    gateway.seed_cart_line(&pid("b1"), 2);
    let service = service(&gateway);

    service.update_cart_quantity(&pid("b1"), 5).await.expect("update");
    assert_eq!(service.cart().await.expect("cart").quantity(&pid("b1")), 5);
    assert_eq!(gateway.request_count(GatewayOp::UpdateCart), 1);

    service.update_cart_quantity(&pid("b1"), 0).await.expect("remove");
    assert!(service.cart().await.expect("cart").is_empty());
    assert_eq!(gateway.request_count(GatewayOp::RemoveCart), 1);
}

#[tokio::test]
async fn update_for_an_absent_line_is_a_no_op() {
    let gateway = MockCommerceGateway::new();
    let service = service(&gateway);

    service.update_cart_quantity(&pid("ghost"), 3).await.expect("no-op");
    assert_eq!(gateway.request_count(GatewayOp::UpdateCart), 0);
}

#[tokio::test]
async fn remove_from_cart_rolls_back_on_failure() {
    let gateway = MockCommerceGateway::new();
    gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
    gateway.seed_cart_line(&pid("b1"), 2);
    let service = service(&gateway);

    let before = service.cart().await.expect("cart");
    gateway.fail_next(
        GatewayOp::RemoveCart,
        GatewayError::RequestFailed("connection reset".to_owned()),
    );

    let error = service.remove_from_cart(&pid("b1")).await.expect_err("fail");
    assert!(matches!(error, CommerceError::NetworkOrServerError(_)));
    assert_eq!(service.cart().await.expect("cart"), before);

    service.remove_from_cart(&pid("b1")).await.expect("retry");
    assert!(service.cart().await.expect("cart").is_empty());
}

#[tokio::test]
async fn double_toggle_restores_original_presence() {
    let gateway = MockCommerceGateway::new();
    gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
    let service = service(&gateway);

    let original = service.wishlist().await.expect("wishlist");
    assert!(!original.contains(&pid("b1")));

    assert!(service.toggle_wishlist(&pid("b1")).await.expect("toggle on"));
    assert!(service.wishlist().await.expect("wishlist").contains(&pid("b1")));

    assert!(!service.toggle_wishlist(&pid("b1")).await.expect("toggle off"));
    assert_eq!(service.wishlist().await.expect("wishlist"), original);
}

#[tokio::test]
async fn wishlist_toggle_rolls_back_on_failure() {
    let gateway = MockCommerceGateway::new();
    gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
    let service = service(&gateway);

    gateway.fail_next(
        GatewayOp::AddWishlist,
        GatewayError::ApiError {
            status: 503,
            message: "unavailable".to_owned(),
        },
    );

    let error = service.toggle_wishlist(&pid("b1")).await.expect_err("fail");
    assert!(matches!(error, CommerceError::NetworkOrServerError(_)));
    assert!(service.wishlist().await.expect("wishlist").is_empty());
    assert!(!service.is_mutating(&EntityKey::Wishlist(pid("b1"))));
}

#[tokio::test]
async fn remove_from_wishlist_clears_the_entry() {
    let gateway = MockCommerceGateway::new();
    gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
    gateway.seed_wishlist(&pid("b1"));
    let service = service(&gateway);

    service.remove_from_wishlist(&pid("b1")).await.expect("remove");
    assert!(service.wishlist().await.expect("wishlist").is_empty());
    assert_eq!(gateway.request_count(GatewayOp::RemoveWishlist), 1);
}

#[tokio::test]
async fn collections_hydrate_lazily_on_first_read() {
    let gateway = MockCommerceGateway::new();
    gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
    gateway.seed_cart_line(&pid("b1"), 2);
    let service = service(&gateway);

    assert_eq!(gateway.request_count(GatewayOp::FetchCart), 0);

    let cart = service.cart().await.expect("cart");
    assert_eq!(cart.quantity(&pid("b1")), 2);
    assert_eq!(gateway.request_count(GatewayOp::FetchCart), 1);

    // Second read hits the cache.
    let _ = service.cart().await.expect("cart");
    assert_eq!(gateway.request_count(GatewayOp::FetchCart), 1);
}

#[tokio::test]
async fn login_establishes_the_session_and_logout_clears_it() {
    let gateway = MockCommerceGateway::new();
    let credentials = MemoryCredentialStore::new();
    let service: Service = CommerceService::new(CommerceEnvironment::new(
        gateway.clone(),
        credentials.clone(),
    ));

    assert!(!service.session().is_authenticated());
    let user = service.login("jo@example.com", "hunter2").await.expect("login");
    assert_eq!(user.email, "jo@example.com");
    assert!(service.session().is_authenticated());
    assert_eq!(service.session().bearer().expect("bearer"), "mock-token");

    service.logout();
    let fresh: Service =
        CommerceService::new(CommerceEnvironment::new(gateway, credentials));
    assert!(!fresh.session().is_authenticated());
}

#[tokio::test]
async fn subscribers_observe_cart_changes() {
    let gateway = MockCommerceGateway::new();
    gateway.seed_catalog(vec![fixtures::product("b1", "Fiction", 450, 4.5)]);
    let service = service(&gateway);
    let product = fixtures::product("b1", "Fiction", 450, 4.5);

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let badge = {
        let seen = Arc::clone(&seen);
        service.subscribe(move |state| {
            seen.lock().expect("seen lock").push(state.cart.len());
        })
    };

    service.add_to_cart(&product).await.expect("add");
    drop(badge);

    let seen = seen.lock().expect("seen lock");
    // Hydration, optimistic patch, reconciliation - and the badge saw the
    // line appear.
    assert!(seen.contains(&1));
}
