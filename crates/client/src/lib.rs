//! Tamarind Client - Storefront client library.
//!
//! The client-side core of the Tamarind restaurant storefront: the cart
//! with its promotional-pricing rules, the promotion sync channel that
//! keeps concurrently running contexts aware of admin price changes, and
//! the HTTP collaborators (menu, checkout, admin) everything talks to.
//!
//! # Architecture
//!
//! - [`storage`] - Scoped key-value persistence (one durable slot per
//!   concern, file-backed in production, in-memory in tests)
//! - [`cart`] - The cart store: ordered line collection, add/merge/clear,
//!   persisted wholesale after every mutation
//! - [`sync`] - Promotion sync channel: in-process subscribers plus a
//!   durable marker slot observed by other contexts
//! - [`api`] - Backend collaborator clients over `reqwest`
//! - [`menu`] - Cached menu view that re-fetches on promotion changes
//! - [`checkout`] - Checkout submission with a single-in-flight guard
//! - [`config`] - Environment-driven configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tamarind_client::{api::ApiClient, cart::CartStore, config::ClientConfig};
//! use tamarind_client::storage::FileStorage;
//!
//! let config = ClientConfig::from_env()?;
//! let storage = Arc::new(FileStorage::new(&config.data_dir));
//! let mut cart = CartStore::load(storage);
//!
//! let api = ApiClient::new(&config);
//! let menu = api.fetch_menu().await?;
//! if let Some(item) = menu.find_item(item_id) {
//!     cart.add_to_cart(&item.into(), 1)?;
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod menu;
pub mod storage;
pub mod sync;
