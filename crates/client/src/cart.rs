//! The cart store.
//!
//! Owns the ordered collection of cart lines and its durable snapshot.
//! The full line set is re-read once at construction and persisted
//! wholesale after every mutation; in-memory state stays authoritative for
//! the session even when persistence fails.
//!
//! Pricing is frozen at add time: each line records both the effective
//! (possibly discounted) and the original unit price observed at the most
//! recent add, so checkout totals and "you saved" amounts stay stable even
//! if an admin changes the promotion afterwards. Re-adding an item
//! overwrites the line's prices with the newest observed values while the
//! quantity accumulates: the entire accumulated quantity is re-priced,
//! there is no per-unit price history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use tamarind_core::{Cents, MenuItemId};

use crate::storage::{Storage, StorageError, slots};

/// One row in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Server-assigned menu item identifier. Unique across the cart.
    pub item_id: MenuItemId,
    /// Display name at time of add; not re-synced against the menu.
    pub name: String,
    /// Accumulated quantity. Always at least 1 for a retained line.
    pub quantity: u32,
    /// Price actually charged per unit, after any discount.
    pub effective_unit_price: Cents,
    /// Undiscounted list price at the most recent add.
    pub original_unit_price: Cents,
    /// Discount applied at the most recent add, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<u8>,
}

/// What a caller must supply to add an item to the cart: the identity and
/// pricing of a menu item as observed at this instant.
#[derive(Debug, Clone)]
pub struct ItemSnapshot {
    pub item_id: MenuItemId,
    pub name: String,
    /// Undiscounted list price.
    pub unit_price: Cents,
    /// Active promotion discount, if the menu reported one.
    pub discount_percent: Option<u8>,
}

/// Derived cart totals. Computed from the line set on demand, never
/// stored, so totals can't drift from the lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of effective unit prices times quantities.
    pub total: Cents,
    /// Sum of original unit prices times quantities.
    pub original_total: Cents,
    /// `original_total - total`; zero when nothing is discounted.
    pub savings: Cents,
    /// Total unit count across all lines (the header badge number).
    pub total_quantity: u32,
}

/// Outcome of the persistence attempt that follows a mutation.
///
/// A mutation always applies in memory; this reports whether it also
/// reached the durable slot. `MemoryOnly` is a warning, not a failure:
/// the session continues, but the cart may not survive a restart.
#[derive(Debug)]
#[must_use]
pub enum PersistStatus {
    /// The snapshot was written durably.
    Durable,
    /// The write failed; in-memory state is authoritative for the session.
    MemoryOnly(StorageError),
}

impl PersistStatus {
    /// Whether the snapshot reached durable storage.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        matches!(self, Self::Durable)
    }
}

/// Cart input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantity must be a positive integer.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// The authoritative local cart.
///
/// Constructed once per context via [`CartStore::load`], mutated in
/// memory, and persisted after every mutation. Each running context owns
/// its cart independently; cart contents are never merged across
/// contexts (only promotion awareness is synchronized, see
/// [`crate::sync`]).
pub struct CartStore {
    storage: Arc<dyn Storage>,
    lines: Vec<CartLine>,
}

impl CartStore {
    /// Load the cart from its durable slot.
    ///
    /// A missing slot yields an empty cart. A read or parse failure also
    /// yields an empty cart with a warning; initialization never fails.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let lines = match storage.get(slots::CART) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!("discarding unreadable cart snapshot: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("failed to read cart snapshot, starting empty: {e}");
                Vec::new()
            }
        };
        Self { storage, lines }
    }

    /// Add `quantity` units of an item to the cart.
    ///
    /// If a line for the item already exists its quantity accumulates and
    /// its prices are overwritten with the values computed from this
    /// snapshot (last-write-wins re-pricing); otherwise a new line is
    /// appended. The full line set is then persisted.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity, before
    /// any state is touched. Persistence failure is not an error; it is
    /// reported through the returned [`PersistStatus`].
    pub fn add_to_cart(
        &mut self,
        item: &ItemSnapshot,
        quantity: u32,
    ) -> Result<PersistStatus, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        // A zero percent means "no promotion"; out-of-range values clamp.
        let discount = item
            .discount_percent
            .filter(|p| *p > 0)
            .map(|p| p.min(100));
        let effective = discount.map_or(item.unit_price, |p| item.unit_price.discounted(p));

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item.item_id) {
            line.quantity = line.quantity.saturating_add(quantity);
            line.effective_unit_price = effective;
            line.original_unit_price = item.unit_price;
            line.discount_percent = discount;
        } else {
            self.lines.push(CartLine {
                item_id: item.item_id,
                name: item.name.clone(),
                quantity,
                effective_unit_price: effective,
                original_unit_price: item.unit_price,
                discount_percent: discount,
            });
        }

        Ok(self.persist())
    }

    /// Empty the cart and persist the empty state. Idempotent.
    pub fn clear(&mut self) -> PersistStatus {
        self.lines.clear();
        self.persist()
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Compute the derived totals for the current line set.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        let total = self
            .lines
            .iter()
            .map(|l| l.effective_unit_price * l.quantity)
            .sum();
        let original_total = self
            .lines
            .iter()
            .map(|l| l.original_unit_price * l.quantity)
            .sum::<Cents>();
        CartTotals {
            total,
            original_total,
            savings: original_total - total,
            total_quantity: self.lines.iter().map(|l| l.quantity).sum(),
        }
    }

    fn persist(&self) -> PersistStatus {
        let snapshot = match serde_json::to_string(&self.lines) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("cart snapshot serialization failed, keeping in-memory state: {e}");
                return PersistStatus::MemoryOnly(e.into());
            }
        };
        match self.storage.put(slots::CART, &snapshot) {
            Ok(()) => PersistStatus::Durable,
            Err(e) => {
                warn!("cart snapshot write failed, keeping in-memory state: {e}");
                PersistStatus::MemoryOnly(e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn latte() -> ItemSnapshot {
        ItemSnapshot {
            item_id: MenuItemId::new(1),
            name: "Latte".to_string(),
            unit_price: Cents::new(450),
            discount_percent: None,
        }
    }

    fn store() -> CartStore {
        CartStore::load(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_add_appends_new_line() {
        let mut cart = store();
        let status = cart.add_to_cart(&latte(), 2).unwrap();
        assert!(status.is_durable());
        assert_eq!(cart.lines().len(), 1);
        let line = &cart.lines()[0];
        assert_eq!(line.quantity, 2);
        assert_eq!(line.effective_unit_price, Cents::new(450));
        assert_eq!(line.original_unit_price, Cents::new(450));
        assert_eq!(line.discount_percent, None);
    }

    #[test]
    fn test_repeat_add_keeps_one_line_per_item() {
        let mut cart = store();
        let _ = cart.add_to_cart(&latte(), 1).unwrap();
        let _ = cart.add_to_cart(&latte(), 1).unwrap();
        let other = ItemSnapshot {
            item_id: MenuItemId::new(2),
            name: "Mocha".to_string(),
            unit_price: Cents::new(500),
            discount_percent: None,
        };
        let _ = cart.add_to_cart(&other, 1).unwrap();
        assert_eq!(cart.lines().len(), 2);
    }

    #[test]
    fn test_quantities_accumulate() {
        let mut cart = store();
        let _ = cart.add_to_cart(&latte(), 2).unwrap();
        let _ = cart.add_to_cart(&latte(), 3).unwrap();
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn test_repeat_add_reprices_entire_line() {
        let mut cart = store();
        let plain = ItemSnapshot {
            unit_price: Cents::new(1000),
            ..latte()
        };
        let _ = cart.add_to_cart(&plain, 2).unwrap();

        let discounted = ItemSnapshot {
            unit_price: Cents::new(1000),
            discount_percent: Some(20),
            ..latte()
        };
        let _ = cart.add_to_cart(&discounted, 1).unwrap();

        let line = &cart.lines()[0];
        assert_eq!(line.quantity, 3);
        assert_eq!(line.effective_unit_price, Cents::new(800));
        assert_eq!(line.original_unit_price, Cents::new(1000));
        assert_eq!(line.discount_percent, Some(20));
    }

    #[test]
    fn test_discount_rounding() {
        let mut cart = store();
        let item = ItemSnapshot {
            unit_price: Cents::new(999),
            discount_percent: Some(33),
            ..latte()
        };
        let _ = cart.add_to_cart(&item, 1).unwrap();
        assert_eq!(cart.lines()[0].effective_unit_price, Cents::new(669));
    }

    #[test]
    fn test_zero_percent_normalizes_to_no_discount() {
        let mut cart = store();
        let item = ItemSnapshot {
            discount_percent: Some(0),
            ..latte()
        };
        let _ = cart.add_to_cart(&item, 1).unwrap();
        let line = &cart.lines()[0];
        assert_eq!(line.discount_percent, None);
        assert_eq!(line.effective_unit_price, line.original_unit_price);
    }

    #[test]
    fn test_zero_quantity_rejected_before_any_change() {
        let mut cart = store();
        let _ = cart.add_to_cart(&latte(), 1).unwrap();
        let err = cart.add_to_cart(&latte(), 0).unwrap_err();
        assert_eq!(err, CartError::InvalidQuantity);
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn test_savings_never_negative() {
        let mut cart = store();
        let _ = cart.add_to_cart(&latte(), 2).unwrap();
        let item = ItemSnapshot {
            item_id: MenuItemId::new(2),
            name: "Mocha".to_string(),
            unit_price: Cents::new(999),
            discount_percent: Some(33),
        };
        let _ = cart.add_to_cart(&item, 4).unwrap();
        let totals = cart.totals();
        assert!(totals.savings >= Cents::ZERO);
        assert_eq!(totals.savings, totals.original_total - totals.total);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = store();
        let _ = cart.add_to_cart(&latte(), 2).unwrap();
        let first = cart.clear();
        assert!(first.is_durable());
        assert!(cart.is_empty());
        let second = cart.clear();
        assert!(second.is_durable());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_latte_scenario() {
        let mut cart = store();

        let _ = cart.add_to_cart(&latte(), 2).unwrap();
        let totals = cart.totals();
        assert_eq!(totals.total, Cents::new(900));
        assert_eq!(totals.savings, Cents::ZERO);

        let discounted = ItemSnapshot {
            discount_percent: Some(50),
            ..latte()
        };
        let _ = cart.add_to_cart(&discounted, 1).unwrap();

        let line = &cart.lines()[0];
        assert_eq!(line.quantity, 3);
        assert_eq!(line.effective_unit_price, Cents::new(225));

        let totals = cart.totals();
        assert_eq!(totals.total, Cents::new(675));
        assert_eq!(totals.original_total, Cents::new(1350));
        assert_eq!(totals.savings, Cents::new(675));
        assert_eq!(totals.total_quantity, 3);
    }

    #[test]
    fn test_persists_across_store_instances() {
        let storage: Arc<MemoryStorage> = Arc::new(MemoryStorage::new());
        {
            let mut cart = CartStore::load(storage.clone());
            let _ = cart.add_to_cart(&latte(), 2).unwrap();
        }
        let cart = CartStore::load(storage);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_corrupt_snapshot_starts_empty() {
        let storage: Arc<MemoryStorage> = Arc::new(MemoryStorage::new());
        storage.put(slots::CART, "not json at all").unwrap();
        let cart = CartStore::load(storage);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_mutation_survives_failed_write() {
        use crate::storage::FileStorage;

        // Pointing the data dir at a regular file makes every write fail.
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut cart = CartStore::load(Arc::new(FileStorage::new(file.path())));
        let status = cart.add_to_cart(&latte(), 1).unwrap();
        assert!(matches!(status, PersistStatus::MemoryOnly(_)));
        assert_eq!(cart.lines().len(), 1);
    }
}
