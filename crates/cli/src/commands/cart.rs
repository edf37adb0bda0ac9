//! Local cart commands.

use std::io::Write as _;
use std::sync::Arc;

use tamarind_client::cart::{CartStore, PersistStatus};
use tamarind_core::MenuItemId;

use super::CliContext;

/// Add an item to the cart at the price (and discount) the menu reports
/// right now.
pub async fn add(
    ctx: &CliContext,
    item_id: MenuItemId,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let menu = ctx.api.fetch_menu().await?;
    let Some(item) = menu.find_item(item_id) else {
        return Err(format!("menu item {item_id} not found").into());
    };
    if !item.available {
        return Err(format!("{} is currently unavailable", item.name).into());
    }

    let mut cart = CartStore::load(Arc::clone(&ctx.storage));
    let status = cart.add_to_cart(&item.into(), quantity)?;
    report_persistence(&status);

    println!("Added {quantity} x {}", item.name);
    print_totals(&cart);
    Ok(())
}

/// Print cart contents and totals.
pub fn show(ctx: &CliContext) {
    let cart = CartStore::load(Arc::clone(&ctx.storage));
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }

    for line in cart.lines() {
        match line.discount_percent {
            Some(percent) => println!(
                "{} x {} @ {} each ({percent}% off, was {})",
                line.quantity, line.name, line.effective_unit_price, line.original_unit_price
            ),
            None => println!(
                "{} x {} @ {} each",
                line.quantity, line.name, line.effective_unit_price
            ),
        }
    }
    print_totals(&cart);
}

/// Empty the cart, prompting for confirmation unless `yes` is set.
pub fn clear(ctx: &CliContext, yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = CartStore::load(Arc::clone(&ctx.storage));
    if cart.is_empty() {
        println!("Your cart is already empty");
        return Ok(());
    }
    if !yes && !confirm("Clear cart?")? {
        return Ok(());
    }
    let status = cart.clear();
    report_persistence(&status);
    println!("Cart cleared");
    Ok(())
}

fn print_totals(cart: &CartStore) {
    let totals = cart.totals();
    if totals.savings > tamarind_core::Cents::ZERO {
        println!(
            "Total: {} (was {}, you saved {})",
            totals.total, totals.original_total, totals.savings
        );
    } else {
        println!("Total: {}", totals.total);
    }
}

fn report_persistence(status: &PersistStatus) {
    if !status.is_durable() {
        tracing::warn!("cart was not saved; it will not survive a restart");
    }
}

fn confirm(prompt: &str) -> Result<bool, std::io::Error> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
