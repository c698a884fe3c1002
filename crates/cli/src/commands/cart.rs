//! Cart commands: optimistic local mutation plus remote push.

use rust_decimal::Decimal;
use tidepool_core::{CurrencyCode, LineItem, PriceTable, ProductId};

use super::engine_from_env;
use super::show::print_cart;

/// Add one unit of a product to the cart.
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

    engine
        .add_to_cart(LineItem {
            id: ProductId::new(id),
            name: name.to_owned(),
            prices: PriceTable::new().with(CurrencyCode::USD, price),
            image_url,
            quantity: 1,
        })
        .await;

    print_cart(&engine.state());
    Ok(())
}

/// Remove a product from the cart entirely.
///
/// # Errors
///
/// Returns an error if environment configuration is missing or invalid.
pub async fn remove(id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine_from_env()?;

    engine.remove_from_cart(ProductId::new(id)).await;

    print_cart(&engine.state());
    Ok(())
}

/// Set the quantity for a product already in the cart.
///
/// # Errors
///
/// Returns an error if environment configuration is missing or invalid.
pub async fn set_quantity(id: i64, quantity: u32) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine_from_env()?;

    engine.set_cart_quantity(ProductId::new(id), quantity).await;

    print_cart(&engine.state());
    Ok(())
}

/// Remove every cart line.
///
/// # Errors
///
/// Returns an error if environment configuration is missing or invalid.
pub async fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine_from_env()?;

    engine.clear_cart().await;

    print_cart(&engine.state());
    Ok(())
}
