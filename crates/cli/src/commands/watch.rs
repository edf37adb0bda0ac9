//! Watch mode: follow promotion changes published by other contexts.

use std::sync::Arc;

use tamarind_client::menu::MenuService;

use super::CliContext;

/// Print the active discounts, then re-fetch and re-print every time a
/// promotion change is observed (locally or from another context).
/// Runs until Ctrl+C.
pub async fn run(ctx: &CliContext) -> Result<(), Box<dyn std::error::Error>> {
    // Order matters: the menu service subscribes first so its cache is
    // already invalidated by the time our wakeup fires a re-fetch.
    let menu = MenuService::new(ctx.api.clone(), &ctx.sync);

    let wakeup = Arc::new(tokio::sync::Notify::new());
    let _subscription = ctx.sync.subscribe({
        let wakeup = Arc::clone(&wakeup);
        move || wakeup.notify_one()
    });
    let _watcher = ctx.sync.watch(ctx.config.sync_poll_interval);

    print_discounts(&menu).await?;
    println!("Watching for promotion changes (Ctrl+C to stop)...");

    loop {
        tokio::select! {
            () = wakeup.notified() => {
                println!("Promotions changed, re-fetching menu");
                if let Err(e) = print_discounts(&menu).await {
                    tracing::error!("menu re-fetch failed: {e}");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

async fn print_discounts(menu: &MenuService) -> Result<(), Box<dyn std::error::Error>> {
    let menu = menu.menu().await?;
    let mut any = false;
    for category in &menu.categories {
        for item in &category.items {
            if let Some(percent) = item.discount_percent {
                println!(
                    "  {} - {} -> {} ({percent}% off)",
                    item.name,
                    item.price_cents,
                    item.price_cents.discounted(percent)
                );
                any = true;
            }
        }
    }
    if !any {
        println!("  No active discounts");
    }
    Ok(())
}
