//! Menu, cart, checkout, and admin flows against the mock backend.

use std::sync::Arc;
use std::time::Duration;

use tamarind_client::api::{ApiClient, ApiError, CheckoutLine, CheckoutRequest, PromotionInput, PromotionPatch};
use tamarind_client::cart::CartStore;
use tamarind_client::checkout::{CheckoutError, CheckoutService, CustomerInfo};
use tamarind_client::menu::MenuService;
use tamarind_client::storage::MemoryStorage;
use tamarind_client::sync::PromoSync;
use tamarind_core::{Cents, MenuItemId, PromotionId};

use tamarind_integration_tests::mock_backend::MockBackend;

fn customer(name: &str) -> CustomerInfo {
    CustomerInfo {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: String::new(),
    }
}

#[tokio::test]
async fn test_menu_is_served_and_parsed_in_both_shapes() {
    let backend = MockBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let api = ApiClient::new(&backend.client_config(dir.path()));

    // Bare array shape, with an active promotion baked into the item.
    backend.lock().promotions.push(
        tamarind_client::api::Promotion {
            id: PromotionId::new(1),
            menu_item_id: MenuItemId::new(1),
            percent: 50,
            active: true,
        },
    );
    let menu = api.fetch_menu().await.expect("menu (array shape)");
    let latte = menu.find_item(MenuItemId::new(1)).expect("latte");
    assert_eq!(latte.discount_percent, Some(50));

    // Tagged shape: raw categories plus a promotion list the client folds.
    backend.lock().tagged_shape = true;
    let menu = api.fetch_menu().await.expect("menu (tagged shape)");
    let latte = menu.find_item(MenuItemId::new(1)).expect("latte");
    assert_eq!(latte.discount_percent, Some(50));
    assert_eq!(menu.promotions.len(), 1);
}

#[tokio::test]
async fn test_add_discounted_item_then_checkout_submits_ids_only() {
    let backend = MockBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let config = backend.client_config(dir.path());
    let api = ApiClient::new(&config);

    // Admin puts the latte on 50% off, then the shopper adds it.
    let promo = api
        .create_promotion(&PromotionInput {
            menu_item_id: MenuItemId::new(1),
            percent: 50,
        })
        .await
        .expect("create promotion");
    assert!(promo.active);

    let menu = api.fetch_menu().await.expect("menu");
    let latte = menu.find_item(MenuItemId::new(1)).expect("latte");

    let mut cart = CartStore::load(Arc::new(MemoryStorage::new()));
    let _ = cart.add_to_cart(&latte.into(), 2).expect("add");
    assert_eq!(cart.totals().total, Cents::new(450));
    assert_eq!(cart.totals().savings, Cents::new(450));

    let service = CheckoutService::new(api);
    let receipt = service
        .submit(&mut cart, &customer("Ada"))
        .await
        .expect("checkout");
    assert_eq!(receipt.status, "pending");

    // Cart is emptied on success.
    assert!(cart.is_empty());

    // The backend saw identifiers and quantities, nothing about prices.
    let state = backend.lock();
    assert_eq!(state.orders.len(), 1);
    assert_eq!(state.orders[0].customer_name, "Ada");
    assert_eq!(state.orders[0].items.len(), 1);
    assert_eq!(state.orders[0].items[0].menu_item_id, MenuItemId::new(1));
    assert_eq!(state.orders[0].items[0].qty, 2);
}

#[tokio::test]
async fn test_rejected_checkout_leaves_the_cart_intact() {
    let backend = MockBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let api = ApiClient::new(&backend.client_config(dir.path()));

    let menu = api.fetch_menu().await.expect("menu");
    let latte = menu.find_item(MenuItemId::new(1)).expect("latte");

    let mut cart = CartStore::load(Arc::new(MemoryStorage::new()));
    let _ = cart.add_to_cart(&latte.into(), 1).expect("add");

    // The item disappears server-side before checkout.
    backend.lock().categories[0].items.clear();

    let service = CheckoutService::new(api);
    let err = service
        .submit(&mut cart, &customer("Ada"))
        .await
        .expect_err("checkout should be rejected");

    match err {
        CheckoutError::Api(ApiError::Rejected(message)) => {
            assert_eq!(message, "Menu item 1 not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Retry is possible: nothing was lost.
    assert_eq!(cart.lines().len(), 1);
}

#[tokio::test]
async fn test_second_concurrent_checkout_is_rejected_locally() {
    let backend = MockBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let api = ApiClient::new(&backend.client_config(dir.path()));
    backend.lock().checkout_delay = Duration::from_millis(200);

    let request = CheckoutRequest {
        items: vec![CheckoutLine {
            menu_item_id: MenuItemId::new(1),
            qty: 1,
        }],
        customer_name: "Ada".to_string(),
        customer_email: String::new(),
        customer_phone: String::new(),
    };

    let service = Arc::new(CheckoutService::new(api));
    let first = {
        let service = Arc::clone(&service);
        let request = request.clone();
        tokio::spawn(async move { service.submit_request(request).await })
    };
    // Let the first submission reach the wire before duplicating it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = service.submit_request(request).await;

    assert!(matches!(second, Err(CheckoutError::InProgress)));
    let first = first.await.expect("join").expect("first checkout");
    assert_eq!(first.status, "pending");

    // Only one order landed.
    assert_eq!(backend.lock().orders.len(), 1);

    // The guard resets once the first submission resolves.
    let third = service
        .submit_request(CheckoutRequest {
            items: vec![CheckoutLine {
                menu_item_id: MenuItemId::new(2),
                qty: 1,
            }],
            customer_name: "Ada".to_string(),
            customer_email: String::new(),
            customer_phone: String::new(),
        })
        .await;
    assert!(third.is_ok());
}

#[tokio::test]
async fn test_admin_mutations_require_the_secret() {
    let backend = MockBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");

    // No secret configured: rejected locally, nothing hits the network.
    let mut config = backend.client_config(dir.path());
    config.admin_secret = None;
    let api = ApiClient::new(&config);
    assert!(matches!(
        api.list_promotions().await,
        Err(ApiError::MissingAdminSecret)
    ));

    // Wrong secret: the backend rejects with its own message.
    config.admin_secret = Some(secrecy::SecretString::from("wrong"));
    let api = ApiClient::new(&config);
    match api.list_promotions().await {
        Err(ApiError::Rejected(message)) => assert_eq!(message, "unauthorized"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_promotion_change_invalidates_the_cached_menu_view() {
    let backend = MockBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let config = backend.client_config(dir.path());
    let api = ApiClient::new(&config);

    let sync = PromoSync::new(Arc::new(MemoryStorage::new()));
    let menu_view = MenuService::new(api.clone(), &sync);

    // First read caches the undiscounted menu.
    let before = menu_view.menu().await.expect("menu");
    assert_eq!(
        before.find_item(MenuItemId::new(2)).expect("mocha").discount_percent,
        None
    );

    // Admin creates a promotion. Without a publish the cached view stays.
    let promo = api
        .create_promotion(&PromotionInput {
            menu_item_id: MenuItemId::new(2),
            percent: 25,
        })
        .await
        .expect("create promotion");
    let cached = menu_view.menu().await.expect("menu");
    assert_eq!(
        cached.find_item(MenuItemId::new(2)).expect("mocha").discount_percent,
        None
    );

    // Publish: the next read re-fetches and replaces the view wholesale.
    sync.publish();
    let after = menu_view.menu().await.expect("menu");
    assert_eq!(
        after.find_item(MenuItemId::new(2)).expect("mocha").discount_percent,
        Some(25)
    );

    // Deactivating it (and publishing) takes the discount back off.
    let _ = api
        .update_promotion(
            promo.id,
            &PromotionPatch {
                active: Some(false),
                ..PromotionPatch::default()
            },
        )
        .await
        .expect("deactivate");
    sync.publish();
    let final_view = menu_view.menu().await.expect("menu");
    assert_eq!(
        final_view.find_item(MenuItemId::new(2)).expect("mocha").discount_percent,
        None
    );
}
