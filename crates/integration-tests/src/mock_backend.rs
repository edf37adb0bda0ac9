//! In-process mock of the Tamarind backend API.
//!
//! Serves the same wire contracts the real backend does: `GET /api/menu`
//! (in either known shape), `POST /api/cart/checkout`, and the
//! `X-Admin-Secret`-gated admin CRUD. Tests mutate [`BackendState`]
//! directly or through the admin client, then drive the storefront client
//! against the server.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path as UrlPath, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::json;

use tamarind_client::api::types::{
    CheckoutRequest, MenuCategory, MenuItem, MenuItemInput, MenuItemPatch, Promotion,
    PromotionInput, PromotionPatch,
};
use tamarind_client::config::ClientConfig;
use tamarind_core::{CategoryId, Cents, MenuItemId, PromotionId};

/// The secret the mock accepts on admin routes.
pub const ADMIN_SECRET: &str = "integration-test-secret";

/// Mutable backend state shared between the server and the test.
pub struct BackendState {
    pub categories: Vec<MenuCategory>,
    pub promotions: Vec<Promotion>,
    /// Serve `{categories, promotions}` instead of the bare array.
    pub tagged_shape: bool,
    /// Artificial latency on checkout, for in-flight guard tests.
    pub checkout_delay: Duration,
    /// Every accepted checkout payload, in order.
    pub orders: Vec<CheckoutRequest>,
    next_order_id: i64,
    next_promotion_id: i64,
    next_item_id: i64,
}

impl BackendState {
    fn seeded() -> Self {
        Self {
            categories: vec![MenuCategory {
                id: CategoryId::new(1),
                name: "Drinks".to_string(),
                items: vec![
                    menu_item(1, "Latte", 450),
                    menu_item(2, "Mocha", 500),
                ],
            }],
            promotions: Vec::new(),
            tagged_shape: false,
            checkout_delay: Duration::ZERO,
            orders: Vec::new(),
            next_order_id: 100,
            next_promotion_id: 1,
            next_item_id: 3,
        }
    }

    fn find_item_mut(&mut self, id: MenuItemId) -> Option<&mut MenuItem> {
        self.categories
            .iter_mut()
            .flat_map(|c| c.items.iter_mut())
            .find(|item| item.id == id)
    }

    fn item_exists(&self, id: MenuItemId) -> bool {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .any(|item| item.id == id)
    }
}

fn menu_item(id: i64, name: &str, price_cents: i64) -> MenuItem {
    MenuItem {
        id: MenuItemId::new(id),
        name: name.to_string(),
        description: String::new(),
        price_cents: Cents::new(price_cents),
        available: true,
        discount_percent: None,
    }
}

type SharedState = Arc<Mutex<BackendState>>;

/// A running mock backend bound to an ephemeral port.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: SharedState,
    handle: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    /// Bind and start serving on a fresh port with the seeded menu.
    pub async fn spawn() -> Self {
        let state: SharedState = Arc::new(Mutex::new(BackendState::seeded()));

        let app = Router::new()
            .route("/api/menu", get(serve_menu))
            .route("/api/cart/checkout", post(serve_checkout))
            .route(
                "/api/admin/promotions",
                get(admin_list_promotions).post(admin_create_promotion),
            )
            .route(
                "/api/admin/promotions/{id}",
                put(admin_update_promotion).delete(admin_delete_promotion),
            )
            .route(
                "/api/admin/menu_items",
                get(admin_list_items).post(admin_create_item),
            )
            .route("/api/admin/menu_items/{id}", put(admin_update_item))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock backend exited");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Client configuration pointing at this backend, with durable state
    /// under `data_dir` and the admin secret set.
    #[must_use]
    pub fn client_config(&self, data_dir: &Path) -> ClientConfig {
        ClientConfig {
            api_base_url: url::Url::parse(&format!("http://{}/api/", self.addr))
                .expect("mock base URL"),
            data_dir: data_dir.to_path_buf(),
            admin_secret: Some(SecretString::from(ADMIN_SECRET)),
            sync_poll_interval: Duration::from_millis(20),
        }
    }

    /// Lock the backend state for direct inspection or mutation.
    ///
    /// # Panics
    ///
    /// Panics if a previous holder panicked.
    pub fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("backend state poisoned")
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Storefront routes
// =============================================================================

/// `GET /api/menu`. The bare-array shape bakes active promotions into the
/// items (like the production backend); the tagged shape serves the raw
/// categories plus the promotion list for the client to fold.
async fn serve_menu(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let state = state.lock().expect("state poisoned");

    if state.tagged_shape {
        return Json(json!({
            "categories": state.categories,
            "promotions": state.promotions,
        }));
    }

    let mut categories = state.categories.clone();
    for promo in state.promotions.iter().filter(|p| p.active && p.percent > 0) {
        for item in categories
            .iter_mut()
            .flat_map(|c| c.items.iter_mut())
            .filter(|item| item.id == promo.menu_item_id)
        {
            item.discount_percent = Some(promo.percent);
        }
    }
    Json(json!(categories))
}

/// `POST /api/cart/checkout`.
async fn serve_checkout(
    State(state): State<SharedState>,
    Json(request): Json<CheckoutRequest>,
) -> Response {
    let delay = {
        let state = state.lock().expect("state poisoned");
        if request.items.is_empty() || request.customer_name.is_empty() {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Missing items or customer name".to_string(),
            );
        }
        for line in &request.items {
            if !state.item_exists(line.menu_item_id) {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Menu item {} not found", line.menu_item_id),
                );
            }
        }
        state.checkout_delay
    };

    if delay > Duration::ZERO {
        tokio::time::sleep(delay).await;
    }

    let mut state = state.lock().expect("state poisoned");
    let order_id = state.next_order_id;
    state.next_order_id += 1;
    state.orders.push(request);
    Json(json!({"order_id": order_id, "status": "pending"})).into_response()
}

// =============================================================================
// Admin routes
// =============================================================================

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("X-Admin-Secret")
        .and_then(|value| value.to_str().ok())
        == Some(ADMIN_SECRET)
}

fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "unauthorized".to_string())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}

async fn admin_list_promotions(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let state = state.lock().expect("state poisoned");
    Json(json!(state.promotions)).into_response()
}

async fn admin_create_promotion(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(input): Json<PromotionInput>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().expect("state poisoned");
    if !state.item_exists(input.menu_item_id) {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Menu item {} not found", input.menu_item_id),
        );
    }
    let promo = Promotion {
        id: PromotionId::new(state.next_promotion_id),
        menu_item_id: input.menu_item_id,
        percent: input.percent,
        active: true,
    };
    state.next_promotion_id += 1;
    state.promotions.push(promo.clone());
    Json(json!(promo)).into_response()
}

async fn admin_update_promotion(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
    headers: HeaderMap,
    Json(patch): Json<PromotionPatch>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().expect("state poisoned");
    let Some(promo) = state
        .promotions
        .iter_mut()
        .find(|p| p.id == PromotionId::new(id))
    else {
        return error_response(StatusCode::NOT_FOUND, format!("Promotion {id} not found"));
    };
    if let Some(percent) = patch.percent {
        promo.percent = percent;
    }
    if let Some(active) = patch.active {
        promo.active = active;
    }
    Json(json!(promo.clone())).into_response()
}

async fn admin_delete_promotion(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().expect("state poisoned");
    state.promotions.retain(|p| p.id != PromotionId::new(id));
    Json(json!({})).into_response()
}

async fn admin_list_items(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let state = state.lock().expect("state poisoned");
    let items: Vec<MenuItem> = state
        .categories
        .iter()
        .flat_map(|c| c.items.iter().cloned())
        .collect();
    Json(json!(items)).into_response()
}

async fn admin_create_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(input): Json<MenuItemInput>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().expect("state poisoned");
    let item = MenuItem {
        id: MenuItemId::new(state.next_item_id),
        name: input.name,
        description: input.description.unwrap_or_default(),
        price_cents: input.price_cents,
        available: true,
        discount_percent: None,
    };
    state.next_item_id += 1;

    let index = input
        .category_id
        .and_then(|id| state.categories.iter().position(|c| c.id == id))
        .unwrap_or(0);
    let Some(category) = state.categories.get_mut(index) else {
        return error_response(StatusCode::BAD_REQUEST, "No categories".to_string());
    };
    category.items.push(item.clone());
    Json(json!(item)).into_response()
}

async fn admin_update_item(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
    headers: HeaderMap,
    Json(patch): Json<MenuItemPatch>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().expect("state poisoned");
    let Some(item) = state.find_item_mut(MenuItemId::new(id)) else {
        return error_response(StatusCode::NOT_FOUND, format!("Menu item {id} not found"));
    };
    if let Some(available) = patch.available {
        item.available = available;
    }
    if let Some(price_cents) = patch.price_cents {
        item.price_cents = price_cents;
    }
    Json(json!(item.clone())).into_response()
}
