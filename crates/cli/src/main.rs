//! Tidepool CLI - poke the cart and wishlist sync engine from a shell.
//!
//! Every mutating command applies locally first and pushes to the remote
//! collection API only when `TIDEPOOL_SESSION_TOKEN` is set, so the same
//! commands exercise both guest mode and the signed-in flow.
//!
//! # Usage
//!
//! ```bash
//! # Add one unit of product 42 to the cart
//! tidepool cart add 42 --name "Tide Clock" --price 18.00
//!
//! # Drop the quantity to zero (removes the record)
//! tidepool cart set-qty 42 0
//!
//! # Toggle wishlist membership
//! tidepool wishlist toggle 7 --name "Kelp Print" --price 24.00
//!
//! # Push guest state to the signed-in account, then trust the server
//! tidepool sync
//!
//! # Print the local state
//! tidepool show
//! ```
//!
//! # Commands
//!
//! - `show` - print the locally persisted cart and wishlist
//! - `cart` - add, remove, set-qty, clear
//! - `wishlist` - add, toggle, remove, clear
//! - `currency` - set the display currency
//! - `refresh` - re-fetch both collections from the remote API
//! - `sync` - run the login merge for the session in the environment

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "tidepool")]
#[command(author, version, about = "Tidepool storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the locally persisted cart and wishlist
    Show,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Set the display currency
    Currency {
        /// ISO 4217 code (USD, EUR, GBP, CAD, AUD)
        code: String,
    },
    /// Re-fetch both collections from the remote API
    Refresh,
    /// Push guest state to the signed-in account, then re-fetch
    Sync,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add one unit of a product
    Add {
        /// Product id
        id: i64,

        /// Product display name
        #[arg(short, long)]
        name: String,

        /// Unit price in USD
        #[arg(short, long)]
        price: Decimal,

        /// Product image URL
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Remove a product entirely, whatever its quantity
    Remove {
        /// Product id
        id: i64,
    },
    /// Set the quantity for a product already in the cart
    SetQty {
        /// Product id
        id: i64,

        /// New quantity (0 removes the record)
        quantity: u32,
    },
    /// Remove every cart line
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Add a product (no-op when already wishlisted)
    Add {
        /// Product id
        id: i64,

        /// Product display name
        #[arg(short, long)]
        name: String,

        /// Unit price in USD
        #[arg(short, long)]
        price: Decimal,

        /// Product image URL
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Add the product if absent, remove it if present
    Toggle {
        /// Product id
        id: i64,

        /// Product display name
        #[arg(short, long)]
        name: String,

        /// Unit price in USD
        #[arg(short, long)]
        price: Decimal,

        /// Product image URL
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Remove a product
    Remove {
        /// Product id
        id: i64,
    },
    /// Remove every wishlist entry
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show => commands::show::print()?,
        Commands::Cart { action } => match action {
            CartAction::Add {
                id,
                name,
                price,
                image_url,
            } => commands::cart::add(id, &name, price, image_url).await?,
            CartAction::Remove { id } => commands::cart::remove(id).await?,
            CartAction::SetQty { id, quantity } => {
                commands::cart::set_quantity(id, quantity).await?;
            }
            CartAction::Clear => commands::cart::clear().await?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Add {
                id,
                name,
                price,
                image_url,
            } => commands::wishlist::add(id, &name, price, image_url).await?,
            WishlistAction::Toggle {
                id,
                name,
                price,
                image_url,
            } => commands::wishlist::toggle(id, &name, price, image_url).await?,
            WishlistAction::Remove { id } => commands::wishlist::remove(id).await?,
            WishlistAction::Clear => commands::wishlist::clear().await?,
        },
        Commands::Currency { code } => commands::show::set_currency(&code)?,
        Commands::Refresh => commands::show::refresh().await?,
        Commands::Sync => commands::sync::login_merge().await?,
    }
    Ok(())
}
