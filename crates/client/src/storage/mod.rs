//! Scoped key-value persistence.
//!
//! The client persists durable state in named slots: the cart line
//! collection and the promotion sync marker. A slot holds one opaque
//! string value and is overwritten wholesale, never appended to.
//!
//! Production code uses [`FileStorage`] (one file per slot under the data
//! directory); tests use [`MemoryStorage`]. Callers treat storage as
//! best-effort: a failed read falls back to a default, a failed write
//! leaves in-memory state authoritative for the session.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Durable slot names.
pub mod slots {
    /// Slot holding the serialized cart line collection.
    pub const CART: &str = "cart";

    /// Slot holding the last promotion-publish marker.
    pub const PROMO_SYNC: &str = "promo_sync";
}

/// Errors that can occur reading or writing a slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Slot contents could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A scoped key-value store with one durable value per slot.
pub trait Storage: Send + Sync {
    /// Read a slot. `Ok(None)` means the slot has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read.
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite a slot with a new value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written durably.
    fn put(&self, slot: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a slot. Removing an absent slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be removed.
    fn remove(&self, slot: &str) -> Result<(), StorageError>;
}
