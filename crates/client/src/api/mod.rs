//! Backend API clients.
//!
//! One JSON-over-HTTP client covering the three collaborator contracts:
//!
//! - **Menu source** - `GET /menu`, the source of truth for prices and
//!   active discounts at add-to-cart time
//! - **Checkout sink** - `POST /cart/checkout`; receives identifiers and
//!   quantities only, never client-computed prices
//! - **Admin mutation sink** - promotion and menu-item CRUD, gated by the
//!   `X-Admin-Secret` header. Callers that change promotions must follow
//!   a successful mutation with [`crate::sync::PromoSync::publish`].

pub mod types;

pub use types::{
    CheckoutLine, CheckoutRequest, Menu, MenuCategory, MenuItem, MenuItemInput, MenuItemPatch,
    MenuResponse, OrderReceipt, Promotion, PromotionInput, PromotionPatch,
};

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use tamarind_core::{MenuItemId, PromotionId};

use crate::config::ClientConfig;

/// Header carrying the admin secret on admin mutations.
const ADMIN_SECRET_HEADER: &str = "X-Admin-Secret";

/// Errors from talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint path could not be joined onto the base URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The backend rejected the request with a user-facing message.
    #[error("{0}")]
    Rejected(String),

    /// Non-success status without a readable error body.
    #[error("unexpected status: {0}")]
    Status(StatusCode),

    /// Admin operation attempted without a configured admin secret.
    #[error("admin secret is not configured")]
    MissingAdminSecret,
}

/// Client for the Tamarind backend API.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    admin_secret: Option<SecretString>,
}

impl ApiClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base_url: config.api_base_url.clone(),
                admin_secret: config.admin_secret.clone(),
            }),
        }
    }

    // =========================================================================
    // Menu source
    // =========================================================================

    /// Fetch the current menu with any active promotions folded in.
    ///
    /// Accepts both wire shapes the backend is known to serve (a bare
    /// category array, or `{categories, promotions}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is unreadable.
    #[instrument(skip(self))]
    pub async fn fetch_menu(&self) -> Result<Menu, ApiError> {
        let response = self.inner.http.get(self.url("menu")?).send().await?;
        let shape: MenuResponse = decode(response).await?;
        Ok(shape.into())
    }

    // =========================================================================
    // Checkout sink
    // =========================================================================

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// A rejection (e.g. an item no longer exists) surfaces as
    /// [`ApiError::Rejected`] with the backend's message.
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<OrderReceipt, ApiError> {
        let response = self
            .inner
            .http
            .post(self.url("cart/checkout")?)
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    // =========================================================================
    // Admin mutation sink
    // =========================================================================

    /// List all promotions, active and inactive.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingAdminSecret`] when no secret is configured.
    #[instrument(skip(self))]
    pub async fn list_promotions(&self) -> Result<Vec<Promotion>, ApiError> {
        let response = self
            .admin_request(Method::GET, "admin/promotions")?
            .send()
            .await?;
        decode(response).await
    }

    /// Create a promotion.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingAdminSecret`] when no secret is configured.
    #[instrument(skip(self))]
    pub async fn create_promotion(&self, input: &PromotionInput) -> Result<Promotion, ApiError> {
        let response = self
            .admin_request(Method::POST, "admin/promotions")?
            .json(input)
            .send()
            .await?;
        decode(response).await
    }

    /// Update a promotion (percent and/or active flag).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingAdminSecret`] when no secret is configured.
    #[instrument(skip(self))]
    pub async fn update_promotion(
        &self,
        id: PromotionId,
        patch: &PromotionPatch,
    ) -> Result<Promotion, ApiError> {
        let response = self
            .admin_request(Method::PUT, &format!("admin/promotions/{id}"))?
            .json(patch)
            .send()
            .await?;
        decode(response).await
    }

    /// Delete a promotion.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingAdminSecret`] when no secret is configured.
    #[instrument(skip(self))]
    pub async fn delete_promotion(&self, id: PromotionId) -> Result<(), ApiError> {
        let response = self
            .admin_request(Method::DELETE, &format!("admin/promotions/{id}"))?
            .send()
            .await?;
        expect_success(response).await
    }

    /// List menu items as the admin console sees them.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingAdminSecret`] when no secret is configured.
    #[instrument(skip(self))]
    pub async fn list_menu_items(&self) -> Result<Vec<MenuItem>, ApiError> {
        let response = self
            .admin_request(Method::GET, "admin/menu_items")?
            .send()
            .await?;
        decode(response).await
    }

    /// Create a menu item.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingAdminSecret`] when no secret is configured.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_menu_item(&self, input: &MenuItemInput) -> Result<MenuItem, ApiError> {
        let response = self
            .admin_request(Method::POST, "admin/menu_items")?
            .json(input)
            .send()
            .await?;
        decode(response).await
    }

    /// Update a menu item (availability and/or list price).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingAdminSecret`] when no secret is configured.
    #[instrument(skip(self))]
    pub async fn update_menu_item(
        &self,
        id: MenuItemId,
        patch: &MenuItemPatch,
    ) -> Result<MenuItem, ApiError> {
        let response = self
            .admin_request(Method::PUT, &format!("admin/menu_items/{id}"))?
            .json(patch)
            .send()
            .await?;
        decode(response).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn admin_request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let secret = self
            .inner
            .admin_secret
            .as_ref()
            .ok_or(ApiError::MissingAdminSecret)?;
        Ok(self
            .inner
            .http
            .request(method, self.url(path)?)
            .header(ADMIN_SECRET_HEADER, secret.expose_secret()))
    }
}

/// Decode a JSON response, mapping non-success statuses to readable errors.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(rejection(status, &body));
    }
    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "failed to parse backend response"
        );
        ApiError::Parse(e)
    })
}

/// Treat any success status as Ok, discarding the body.
async fn expect_success(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await?;
    Err(rejection(status, &body))
}

/// Map a non-success response to the backend's `{error}` message when it
/// has one, or a bare status error otherwise.
fn rejection(status: StatusCode, body: &str) -> ApiError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }
    serde_json::from_str::<ErrorBody>(body)
        .map_or(ApiError::Status(status), |b| ApiError::Rejected(b.error))
}
