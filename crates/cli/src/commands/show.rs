//! Render the local storefront state.

use std::str::FromStr;

use tidepool_core::CurrencyCode;
use tidepool_sync::state::StorefrontState;
use tracing::info;

use super::engine_from_env;

/// Print the locally persisted cart and wishlist.
///
/// # Errors
///
/// Returns an error if environment configuration is missing or invalid.
pub fn print() -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine_from_env()?;
    print_state(&engine.state());
    Ok(())
}

/// Set the display currency and persist the choice.
///
/// # Errors
///
/// Returns an error if the code is not a supported ISO 4217 currency or
/// environment configuration is missing.
pub fn set_currency(code: &str) -> Result<(), Box<dyn std::error::Error>> {
    let currency = CurrencyCode::from_str(code)?;

    let engine = engine_from_env()?;
    engine.set_currency(currency);

    info!(%currency, "Display currency updated");
    Ok(())
}

/// Re-fetch both collections from the remote API and print the result.
///
/// Signed out this is a no-op on state; the command still prints whatever
/// is persisted locally.
///
/// # Errors
///
/// Returns an error if environment configuration is missing or either
/// fetch fails.
pub async fn refresh() -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine_from_env()?;

    engine.refresh_cart().await;
    engine.refresh_wishlist().await;

    let state = engine.state();
    print_state(&state);

    if let Some(error) = collection_error(&state) {
        return Err(format!("refresh failed: {error}").into());
    }
    Ok(())
}

/// First whole-collection error in the state, if any.
pub(crate) fn collection_error(state: &StorefrontState) -> Option<&str> {
    state.cart.error.as_deref().or(state.wishlist.error.as_deref())
}

pub(crate) fn print_state(state: &StorefrontState) {
    print_cart(state);
    print_wishlist(state);
}

#[allow(clippy::print_stdout)]
pub(crate) fn print_cart(state: &StorefrontState) {
    let currency = state.currency;

    println!(
        "Cart ({} units across {} products):",
        state.cart_count(),
        state.cart.len()
    );

    let mut lines: Vec<_> = state.cart.items.values().collect();
    lines.sort_by_key(|item| item.id);
    for item in lines {
        let total = item
            .line_total(currency)
            .map_or_else(|| "no price".to_owned(), |t| currency.format_amount(t));
        println!("  [{}] {} x{}  {}", item.id, item.name, item.quantity, total);
    }

    let mut deferred: Vec<_> = state.cart.pending_removals.iter().copied().collect();
    deferred.sort_unstable();
    for id in deferred {
        println!("  [{id}] pending removal");
    }

    println!(
        "  subtotal: {}",
        currency.format_amount(state.cart_subtotal())
    );
    if let Some(error) = &state.cart.error {
        println!("  last error: {error}");
    }
}

#[allow(clippy::print_stdout)]
pub(crate) fn print_wishlist(state: &StorefrontState) {
    let currency = state.currency;

    println!("Wishlist ({} products):", state.wishlist.len());

    let mut entries: Vec<_> = state.wishlist.items.values().collect();
    entries.sort_by_key(|entry| entry.id);
    for entry in entries {
        let price = entry
            .prices
            .amount_in(currency)
            .map_or_else(|| "no price".to_owned(), |p| currency.format_amount(p));
        println!("  [{}] {}  {}", entry.id, entry.name, price);
    }

    let mut deferred: Vec<_> = state.wishlist.pending_removals.iter().copied().collect();
    deferred.sort_unstable();
    for id in deferred {
        println!("  [{id}] pending removal");
    }

    if let Some(error) = &state.wishlist.error {
        println!("  last error: {error}");
    }
}
