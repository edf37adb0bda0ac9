//! Wire types for the backend API.
//!
//! These mirror the JSON the backend serves; field names follow the wire
//! format. Nothing here is persisted locally, so the shapes can track the
//! backend freely.

use serde::{Deserialize, Serialize};

use tamarind_core::{CategoryId, Cents, MenuItemId, OrderId, PromotionId};

use crate::cart::{CartLine, ItemSnapshot};

const fn default_true() -> bool {
    true
}

/// A menu item as served by the menu endpoint.
///
/// `discount_percent` is present only while an active promotion applies;
/// it is the source of truth for pricing at add-to-cart time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: Cents,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<u8>,
}

impl From<&MenuItem> for ItemSnapshot {
    fn from(item: &MenuItem) -> Self {
        Self {
            item_id: item.id,
            name: item.name.clone(),
            unit_price: item.price_cents,
            discount_percent: item.discount_percent,
        }
    }
}

/// A menu category with its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// An admin-defined percentage discount on one menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: PromotionId,
    pub menu_item_id: MenuItemId,
    pub percent: u8,
    pub active: bool,
}

/// The two shapes the menu endpoint is known to serve: a bare category
/// array, or an object with a separate promotion list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MenuResponse {
    Categories(Vec<MenuCategory>),
    WithPromotions {
        categories: Vec<MenuCategory>,
        #[serde(default)]
        promotions: Vec<Promotion>,
    },
}

/// The normalized menu: categories with any active promotions already
/// folded into the items' `discount_percent`.
#[derive(Debug, Clone)]
pub struct Menu {
    pub categories: Vec<MenuCategory>,
    pub promotions: Vec<Promotion>,
}

impl Menu {
    /// Find an item by id across all categories.
    #[must_use]
    pub fn find_item(&self, id: MenuItemId) -> Option<&MenuItem> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .find(|item| item.id == id)
    }
}

impl From<MenuResponse> for Menu {
    fn from(response: MenuResponse) -> Self {
        match response {
            MenuResponse::Categories(categories) => Self {
                categories,
                promotions: Vec::new(),
            },
            MenuResponse::WithPromotions {
                mut categories,
                promotions,
            } => {
                // Fold active promotions onto their items so consumers see
                // one pricing source regardless of which shape was served.
                for promo in promotions.iter().filter(|p| p.active && p.percent > 0) {
                    for item in categories
                        .iter_mut()
                        .flat_map(|c| c.items.iter_mut())
                        .filter(|item| item.id == promo.menu_item_id)
                    {
                        item.discount_percent = Some(promo.percent);
                    }
                }
                Self {
                    categories,
                    promotions,
                }
            }
        }
    }
}

/// One line of a checkout submission: identifier and quantity only.
/// Prices are deliberately absent; the backend reprices server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub menu_item_id: MenuItemId,
    pub qty: u32,
}

impl From<&CartLine> for CheckoutLine {
    fn from(line: &CartLine) -> Self {
        Self {
            menu_item_id: line.item_id,
            qty: line.quantity,
        }
    }
}

/// Checkout submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutLine>,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
}

/// Successful checkout response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub status: String,
}

/// Payload for creating a promotion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionInput {
    pub menu_item_id: MenuItemId,
    pub percent: u8,
}

/// Partial update of a promotion; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromotionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Payload for creating a menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemInput {
    pub name: String,
    pub price_cents: Cents,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

/// Partial update of a menu item; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<Cents>,
}
