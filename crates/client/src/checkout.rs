//! Checkout submission.
//!
//! Validates locally, submits identifiers and quantities to the checkout
//! sink, and clears the cart on success. Client-side totals are display
//! only; the backend reprices every line, so no price ever leaves the
//! client.
//!
//! One checkout may be in flight per service at a time: a second
//! submission while one is outstanding is rejected locally rather than
//! risking a duplicate order. There is no timeout on the outstanding
//! request.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::api::{ApiClient, ApiError, CheckoutLine, CheckoutRequest, OrderReceipt};
use crate::cart::CartStore;

/// Customer contact fields collected at checkout.
#[derive(Debug, Clone, Default)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Checkout failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Name is required before anything is sent to the network.
    #[error("please enter your name")]
    MissingName,

    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// A submission is already outstanding.
    #[error("a checkout is already in progress")]
    InProgress,

    /// The backend rejected or the request failed; the cart is untouched
    /// so the user can retry.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Checkout flow with a single-in-flight guard.
pub struct CheckoutService {
    api: ApiClient,
    in_flight: AtomicBool,
}

impl CheckoutService {
    /// Create the service.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self {
            api,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Validate, submit the cart, and clear it on success.
    ///
    /// The cart is left unchanged on every failure path.
    ///
    /// # Errors
    ///
    /// Validation errors ([`CheckoutError::MissingName`],
    /// [`CheckoutError::EmptyCart`]) are raised before any I/O;
    /// [`CheckoutError::InProgress`] when a submission is outstanding;
    /// [`CheckoutError::Api`] for backend rejections and transport
    /// failures.
    pub async fn submit(
        &self,
        cart: &mut CartStore,
        customer: &CustomerInfo,
    ) -> Result<OrderReceipt, CheckoutError> {
        if customer.name.trim().is_empty() {
            return Err(CheckoutError::MissingName);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let receipt = self.submit_request(build_request(cart, customer)).await?;

        // Order accepted; the cart's job is done. A failed persist of the
        // empty state is already logged by the store.
        let _ = cart.clear();
        Ok(receipt)
    }

    /// Submit a prebuilt request under the in-flight guard.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InProgress`] if another submission is
    /// outstanding on this service.
    pub async fn submit_request(
        &self,
        request: CheckoutRequest,
    ) -> Result<OrderReceipt, CheckoutError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(CheckoutError::InProgress);
        }
        let _guard = InFlightGuard(&self.in_flight);

        Ok(self.api.checkout(&request).await?)
    }
}

/// Resets the in-flight flag when the submission resolves (or is dropped).
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn build_request(cart: &CartStore, customer: &CustomerInfo) -> CheckoutRequest {
    CheckoutRequest {
        items: cart.lines().iter().map(CheckoutLine::from).collect(),
        customer_name: customer.name.clone(),
        customer_email: customer.email.clone(),
        customer_phone: customer.phone.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cart::ItemSnapshot;
    use crate::config::ClientConfig;
    use crate::storage::MemoryStorage;
    use tamarind_core::{Cents, MenuItemId};

    fn service() -> CheckoutService {
        // Validation failures never reach the network, so an unreachable
        // base URL is fine here.
        let config = ClientConfig {
            api_base_url: url::Url::parse("http://127.0.0.1:9/api/").unwrap(),
            data_dir: std::path::PathBuf::from(".tamarind"),
            admin_secret: None,
            sync_poll_interval: std::time::Duration::from_millis(1000),
        };
        CheckoutService::new(ApiClient::new(&config))
    }

    fn cart_with_latte() -> CartStore {
        let mut cart = CartStore::load(Arc::new(MemoryStorage::new()));
        let _ = cart
            .add_to_cart(
                &ItemSnapshot {
                    item_id: MenuItemId::new(1),
                    name: "Latte".to_string(),
                    unit_price: Cents::new(450),
                    discount_percent: None,
                },
                2,
            )
            .unwrap();
        cart
    }

    #[tokio::test]
    async fn test_missing_name_rejected_before_io() {
        let mut cart = cart_with_latte();
        let err = service()
            .submit(&mut cart, &CustomerInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::MissingName));
        // Cart untouched on rejection.
        assert_eq!(cart.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_before_io() {
        let mut cart = CartStore::load(Arc::new(MemoryStorage::new()));
        let customer = CustomerInfo {
            name: "Ada".to_string(),
            ..CustomerInfo::default()
        };
        let err = service()
            .submit(&mut cart, &customer)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[test]
    fn test_request_carries_ids_and_quantities_only() {
        let cart = cart_with_latte();
        let customer = CustomerInfo {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
        };
        let request = build_request(&cart, &customer);
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].menu_item_id, MenuItemId::new(1));
        assert_eq!(request.items[0].qty, 2);
        assert_eq!(request.customer_name, "Ada");
    }
}
