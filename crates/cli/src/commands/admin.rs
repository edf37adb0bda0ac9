//! Admin mutation commands.
//!
//! Every pricing-affecting mutation (promotion CRUD, menu-item price or
//! availability changes) is followed by a promotion sync publish so other
//! running contexts re-fetch their menus.

use tamarind_client::api::{MenuItemInput, MenuItemPatch, PromotionInput, PromotionPatch};
use tamarind_core::{CategoryId, Cents, MenuItemId, PromotionId};

use super::CliContext;

/// List all promotions.
pub async fn promo_list(ctx: &CliContext) -> Result<(), Box<dyn std::error::Error>> {
    let promotions = ctx.api.list_promotions().await?;
    if promotions.is_empty() {
        println!("No promotions");
        return Ok(());
    }
    for promo in promotions {
        println!(
            "[{}] item {} - {}% off ({})",
            promo.id,
            promo.menu_item_id,
            promo.percent,
            if promo.active { "active" } else { "inactive" }
        );
    }
    Ok(())
}

/// Create a promotion and notify other contexts.
pub async fn promo_create(
    ctx: &CliContext,
    item_id: MenuItemId,
    percent: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let promo = ctx
        .api
        .create_promotion(&PromotionInput {
            menu_item_id: item_id,
            percent,
        })
        .await?;
    ctx.sync.publish();
    println!("Created promotion {} ({percent}% off item {item_id})", promo.id);
    Ok(())
}

/// Change a promotion's percent and notify other contexts.
pub async fn promo_set_percent(
    ctx: &CliContext,
    id: PromotionId,
    percent: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    ctx.api
        .update_promotion(
            id,
            &PromotionPatch {
                percent: Some(percent),
                ..PromotionPatch::default()
            },
        )
        .await?;
    ctx.sync.publish();
    println!("Promotion {id} set to {percent}% off");
    Ok(())
}

/// Activate or deactivate a promotion and notify other contexts.
pub async fn promo_set_active(
    ctx: &CliContext,
    id: PromotionId,
    active: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    ctx.api
        .update_promotion(
            id,
            &PromotionPatch {
                active: Some(active),
                ..PromotionPatch::default()
            },
        )
        .await?;
    ctx.sync.publish();
    println!(
        "Promotion {id} {}",
        if active { "activated" } else { "deactivated" }
    );
    Ok(())
}

/// Delete a promotion and notify other contexts.
pub async fn promo_delete(
    ctx: &CliContext,
    id: PromotionId,
) -> Result<(), Box<dyn std::error::Error>> {
    ctx.api.delete_promotion(id).await?;
    ctx.sync.publish();
    println!("Promotion {id} deleted");
    Ok(())
}

/// List menu items with admin detail.
pub async fn item_list(ctx: &CliContext) -> Result<(), Box<dyn std::error::Error>> {
    for item in ctx.api.list_menu_items().await? {
        println!("{}", super::menu::format_item_line(&item));
    }
    Ok(())
}

/// Create a menu item.
pub async fn item_create(
    ctx: &CliContext,
    name: &str,
    price: &str,
    description: Option<String>,
    category: Option<CategoryId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let item = ctx
        .api
        .create_menu_item(&MenuItemInput {
            name: name.to_string(),
            price_cents: parse_dollars(price)?,
            description,
            category_id: category,
        })
        .await?;
    println!("Created menu item {} ({})", item.id, item.name);
    Ok(())
}

/// Change a menu item's list price and notify other contexts.
pub async fn item_set_price(
    ctx: &CliContext,
    id: MenuItemId,
    price: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let item = ctx
        .api
        .update_menu_item(
            id,
            &MenuItemPatch {
                price_cents: Some(parse_dollars(price)?),
                ..MenuItemPatch::default()
            },
        )
        .await?;
    ctx.sync.publish();
    println!("{} now costs {}", item.name, item.price_cents);
    Ok(())
}

/// Change a menu item's availability and notify other contexts.
pub async fn item_set_available(
    ctx: &CliContext,
    id: MenuItemId,
    available: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let item = ctx
        .api
        .update_menu_item(
            id,
            &MenuItemPatch {
                available: Some(available),
                ..MenuItemPatch::default()
            },
        )
        .await?;
    ctx.sync.publish();
    println!(
        "{} is now {}",
        item.name,
        if available { "available" } else { "unavailable" }
    );
    Ok(())
}

/// Parse a dollar amount like `3.50` into cents without going through
/// floating point.
fn parse_dollars(raw: &str) -> Result<Cents, String> {
    let raw = raw.trim();
    let err = || format!("invalid price {raw:?}, expected dollars like 3.50");

    let (dollars, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    let dollars: i64 = dollars.parse().map_err(|_| err())?;
    if dollars < 0 {
        return Err(err());
    }
    let cents = match fraction.len() {
        0 => 0,
        1 | 2 => {
            let parsed = i64::from(fraction.parse::<u8>().map_err(|_| err())?);
            if fraction.len() == 1 { parsed * 10 } else { parsed }
        }
        _ => return Err(err()),
    };
    Ok(Cents::new(dollars * 100 + cents))
}
