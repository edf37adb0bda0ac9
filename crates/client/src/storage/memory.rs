//! In-memory slot storage for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Storage, StorageError};

/// Slot storage backed by a mutex-guarded map.
///
/// Shared between test "contexts" via `Arc` to stand in for two processes
/// observing the same data directory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(slot)
            .cloned())
    }

    fn put(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(slot.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), StorageError> {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(slot);
        Ok(())
    }
}
