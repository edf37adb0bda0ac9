//! Integration tests for Tamarind.
//!
//! The library part of this crate is the test harness: an in-process mock
//! of the backend API (menu source, checkout sink, admin mutation sink)
//! that the client crates are exercised against. The tests themselves
//! live in `tests/`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tamarind-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Durable cart snapshots across store instances
//! - `promo_sync` - Cross-context promotion change delivery
//! - `storefront_flow` - Menu, cart, checkout, and admin flows against
//!   the mock backend

pub mod mock_backend;
