//! Tamarind Core - Shared types library.
//!
//! This crate provides common types used across all Tamarind components:
//! - `client` - Storefront client library (cart, promotion sync, API access)
//! - `cli` - Command-line ordering and admin tools
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! persistence. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and integer money

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
