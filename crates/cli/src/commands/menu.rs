//! Menu browsing commands.

use tamarind_client::api::{Menu, MenuItem};
use tamarind_core::MenuItemId;

use super::CliContext;

/// Print the full menu grouped by category.
pub async fn list(ctx: &CliContext) -> Result<(), Box<dyn std::error::Error>> {
    let menu: Menu = ctx.api.fetch_menu().await?;
    for category in &menu.categories {
        println!("{}", category.name);
        for item in &category.items {
            println!("  {}", format_item_line(item));
        }
    }
    Ok(())
}

/// Print one item in detail.
pub async fn show_item(
    ctx: &CliContext,
    id: MenuItemId,
) -> Result<(), Box<dyn std::error::Error>> {
    let menu = ctx.api.fetch_menu().await?;
    let Some(item) = menu.find_item(id) else {
        return Err(format!("menu item {id} not found").into());
    };
    println!("{}", item.name);
    if !item.description.is_empty() {
        println!("  {}", item.description);
    }
    println!("  {}", format_price(item));
    if !item.available {
        println!("  (currently unavailable)");
    }
    Ok(())
}

/// One menu row: id, name, price (with discount when active), availability.
pub fn format_item_line(item: &MenuItem) -> String {
    let mut line = format!("[{}] {} - {}", item.id, item.name, format_price(item));
    if !item.available {
        line.push_str(" (unavailable)");
    }
    line
}

fn format_price(item: &MenuItem) -> String {
    item.discount_percent.map_or_else(
        || item.price_cents.to_string(),
        |percent| {
            format!(
                "{} -> {} ({percent}% off)",
                item.price_cents,
                item.price_cents.discounted(percent)
            )
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tamarind_core::Cents;

    fn item(discount: Option<u8>) -> MenuItem {
        MenuItem {
            id: MenuItemId::new(3),
            name: "Latte".to_string(),
            description: String::new(),
            price_cents: Cents::new(450),
            available: true,
            discount_percent: discount,
        }
    }

    #[test]
    fn test_plain_item_line() {
        assert_eq!(format_item_line(&item(None)), "[3] Latte - $4.50");
    }

    #[test]
    fn test_discounted_item_line() {
        assert_eq!(
            format_item_line(&item(Some(50))),
            "[3] Latte - $4.50 -> $2.25 (50% off)"
        );
    }
}
