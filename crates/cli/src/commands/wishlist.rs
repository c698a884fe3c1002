//! Wishlist commands: membership toggles with optimistic apply.

use rust_decimal::Decimal;
use tidepool_core::{CurrencyCode, PriceTable, ProductId, WishlistEntry};

use super::engine_from_env;
use super::show::print_wishlist;

fn entry(id: i64, name: &str, price: Decimal, image_url: Option<String>) -> WishlistEntry {
    WishlistEntry {
        id: ProductId::new(id),
        name: name.to_owned(),
        prices: PriceTable::new().with(CurrencyCode::USD, price),
        image_url,
    }
}

/// Add a product to the wishlist. Already-present products are left alone.
///
/// # Errors
///
/// Returns an error if environment configuration is missing or invalid.
pub async fn add(
    id: i64,
    name: &str,
    price: Decimal,
    image_url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine_from_env()?;

    engine.add_to_wishlist(entry(id, name, price, image_url)).await;

    print_wishlist(&engine.state());
    Ok(())
}

/// Add the product if absent, remove it if present.
///
/// # Errors
///
/// Returns an error if environment configuration is missing or invalid.
pub async fn toggle(
    id: i64,
    name: &str,
    price: Decimal,
    image_url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine_from_env()?;

    engine.toggle_wishlist(entry(id, name, price, image_url)).await;

    print_wishlist(&engine.state());
    Ok(())
}

/// Remove a product from the wishlist.
///
/// # Errors
///
/// Returns an error if environment configuration is missing or invalid.
pub async fn remove(id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine_from_env()?;

    engine.remove_from_wishlist(ProductId::new(id)).await;

    print_wishlist(&engine.state());
    Ok(())
}

/// Remove every wishlist entry.
///
/// # Errors
///
/// Returns an error if environment configuration is missing or invalid.
pub async fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine_from_env()?;

    engine.clear_wishlist().await;

    print_wishlist(&engine.state());
    Ok(())
}
