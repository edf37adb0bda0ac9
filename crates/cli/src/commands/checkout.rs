//! Checkout command.

use std::sync::Arc;

use tamarind_client::cart::CartStore;
use tamarind_client::checkout::{CheckoutService, CustomerInfo};

use super::CliContext;

/// Submit the cart as an order and print the confirmation.
pub async fn submit(
    ctx: &CliContext,
    name: String,
    email: String,
    phone: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = CartStore::load(Arc::clone(&ctx.storage));
    let totals = cart.totals();

    let service = CheckoutService::new(ctx.api.clone());
    let customer = CustomerInfo { name, email, phone };
    let receipt = service.submit(&mut cart, &customer).await?;

    println!("Thank you! Your order id: {}", receipt.order_id);
    println!("Status: {}", receipt.status);
    println!("Total charged (display only): {}", totals.total);
    Ok(())
}
