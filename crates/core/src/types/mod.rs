//! Core types for Tamarind.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cents;
pub mod id;

pub use cents::Cents;
pub use id::*;
