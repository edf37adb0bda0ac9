//! Menu display consumer.
//!
//! Holds the menu (with its promotional pricing) behind a short-lived
//! cache and subscribes to the promotion sync channel: every publish
//! invalidates the cache, so the next read re-fetches from the menu
//! source and replaces the displayed set wholesale. Stale entries are
//! never patched incrementally or merged.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use tamarind_core::MenuItemId;

use crate::api::{ApiClient, ApiError, Menu, MenuItem};
use crate::sync::{PromoSync, Subscription};

/// How long a fetched menu may be served before a re-fetch even without
/// a promotion change.
const MENU_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cached, promotion-aware view of the menu.
pub struct MenuService {
    api: ApiClient,
    cache: Cache<(), Arc<Menu>>,
    _subscription: Subscription,
}

impl MenuService {
    /// Create the service and subscribe it to promotion changes.
    ///
    /// The subscription lives as long as the service; dropping the
    /// service unregisters it.
    #[must_use]
    pub fn new(api: ApiClient, sync: &PromoSync) -> Self {
        let cache: Cache<(), Arc<Menu>> = Cache::builder()
            .max_capacity(1)
            .time_to_live(MENU_CACHE_TTL)
            .build();

        let subscription = {
            let cache = cache.clone();
            sync.subscribe(move || cache.invalidate_all())
        };

        Self {
            api,
            cache,
            _subscription: subscription,
        }
    }

    /// The current menu, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if a re-fetch is needed and fails; any previously
    /// displayed data is already invalidated at that point, so the caller
    /// shows the error rather than stale prices.
    pub async fn menu(&self) -> Result<Arc<Menu>, ApiError> {
        if let Some(menu) = self.cache.get(&()).await {
            return Ok(menu);
        }
        let menu = Arc::new(self.api.fetch_menu().await?);
        self.cache.insert((), Arc::clone(&menu)).await;
        Ok(menu)
    }

    /// Look up one item by id across all categories (the item-detail view).
    ///
    /// # Errors
    ///
    /// Returns an error if the menu cannot be fetched.
    pub async fn find_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, ApiError> {
        Ok(self.menu().await?.find_item(id).cloned())
    }
}
