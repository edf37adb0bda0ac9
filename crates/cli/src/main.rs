//! Tamarind CLI - Command-line ordering and admin client.
//!
//! # Usage
//!
//! ```bash
//! # Browse the menu
//! tamarind menu
//!
//! # Add two of item 3 to the cart, then check out
//! tamarind cart add 3 -q 2
//! tamarind checkout -n "Ada Lovelace" -e ada@example.com
//!
//! # Admin: put item 3 on a 20% promotion (requires TAMARIND_ADMIN_SECRET)
//! tamarind admin promo create 3 20
//!
//! # Watch for promotion changes made by other running contexts
//! tamarind watch
//! ```
//!
//! # Commands
//!
//! - `menu` / `item` - Browse the menu with current promotional pricing
//! - `cart` - Add to, show, and clear the local cart
//! - `checkout` - Submit the cart as an order
//! - `admin` - Promotion and menu-item mutations
//! - `watch` - Follow cross-context promotion changes

#![cfg_attr(not(test), forbid(unsafe_code))]
// A storefront CLI talks to the terminal
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tamarind_core::{CategoryId, MenuItemId, PromotionId};

mod commands;

use commands::CliContext;

#[derive(Parser)]
#[command(name = "tamarind")]
#[command(version, about = "Tamarind restaurant storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the menu with current promotional pricing
    Menu,
    /// Show one menu item in detail
    Item {
        /// Menu item ID
        id: MenuItemId,
    },
    /// Local cart operations
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as an order
    Checkout {
        /// Customer name (required by the backend)
        #[arg(short, long)]
        name: String,

        /// Customer email
        #[arg(short, long, default_value = "")]
        email: String,

        /// Customer phone
        #[arg(short, long, default_value = "")]
        phone: String,
    },
    /// Admin mutations (requires `TAMARIND_ADMIN_SECRET`)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Follow promotion changes published by other running contexts
    Watch,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add an item to the cart at its current price
    Add {
        /// Menu item ID
        item_id: MenuItemId,

        /// Number of units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Show cart contents and totals
    Show,
    /// Empty the cart
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Manage promotions
    Promo {
        #[command(subcommand)]
        action: PromoAction,
    },
    /// Manage menu items
    Item {
        #[command(subcommand)]
        action: ItemAction,
    },
}

#[derive(Subcommand)]
enum PromoAction {
    /// List all promotions
    List,
    /// Create a promotion for a menu item
    Create {
        /// Menu item ID
        item_id: MenuItemId,

        /// Discount percent (1-100)
        percent: u8,
    },
    /// Change a promotion's discount percent
    SetPercent {
        /// Promotion ID
        id: PromotionId,

        /// Discount percent (1-100)
        percent: u8,
    },
    /// Activate a promotion
    Enable {
        /// Promotion ID
        id: PromotionId,
    },
    /// Deactivate a promotion
    Disable {
        /// Promotion ID
        id: PromotionId,
    },
    /// Delete a promotion
    Delete {
        /// Promotion ID
        id: PromotionId,
    },
}

#[derive(Subcommand)]
enum ItemAction {
    /// List menu items as the admin sees them
    List,
    /// Create a menu item
    Create {
        /// Item name
        #[arg(short, long)]
        name: String,

        /// List price in dollars (e.g. 3.50)
        #[arg(short, long)]
        price: String,

        /// Item description
        #[arg(short, long)]
        description: Option<String>,

        /// Category ID
        #[arg(short, long)]
        category: Option<CategoryId>,
    },
    /// Change a menu item's list price
    SetPrice {
        /// Menu item ID
        id: MenuItemId,

        /// New list price in dollars (e.g. 3.50)
        price: String,
    },
    /// Make a menu item orderable
    Enable {
        /// Menu item ID
        id: MenuItemId,
    },
    /// Take a menu item off sale
    Disable {
        /// Menu item ID
        id: MenuItemId,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tamarind=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = CliContext::init()?;

    match cli.command {
        Commands::Menu => commands::menu::list(&ctx).await?,
        Commands::Item { id } => commands::menu::show_item(&ctx, id).await?,
        Commands::Cart { action } => match action {
            CartAction::Add { item_id, quantity } => {
                commands::cart::add(&ctx, item_id, quantity).await?;
            }
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Clear { yes } => commands::cart::clear(&ctx, yes)?,
        },
        Commands::Checkout { name, email, phone } => {
            commands::checkout::submit(&ctx, name, email, phone).await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Promo { action } => match action {
                PromoAction::List => commands::admin::promo_list(&ctx).await?,
                PromoAction::Create { item_id, percent } => {
                    commands::admin::promo_create(&ctx, item_id, percent).await?;
                }
                PromoAction::SetPercent { id, percent } => {
                    commands::admin::promo_set_percent(&ctx, id, percent).await?;
                }
                PromoAction::Enable { id } => {
                    commands::admin::promo_set_active(&ctx, id, true).await?;
                }
                PromoAction::Disable { id } => {
                    commands::admin::promo_set_active(&ctx, id, false).await?;
                }
                PromoAction::Delete { id } => commands::admin::promo_delete(&ctx, id).await?,
            },
            AdminAction::Item { action } => match action {
                ItemAction::List => commands::admin::item_list(&ctx).await?,
                ItemAction::Create {
                    name,
                    price,
                    description,
                    category,
                } => {
                    commands::admin::item_create(&ctx, &name, &price, description, category)
                        .await?;
                }
                ItemAction::SetPrice { id, price } => {
                    commands::admin::item_set_price(&ctx, id, &price).await?;
                }
                ItemAction::Enable { id } => {
                    commands::admin::item_set_available(&ctx, id, true).await?;
                }
                ItemAction::Disable { id } => {
                    commands::admin::item_set_available(&ctx, id, false).await?;
                }
            },
        },
        Commands::Watch => commands::watch::run(&ctx).await?,
    }
    Ok(())
}
