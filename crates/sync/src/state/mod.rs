//! Observable storefront state and its reducers.
//!
//! State changes only through [`reduce`], a pure synchronous function over
//! tagged mutations. The engine dispatches `*Requested` mutations before
//! any network call begins (the optimistic apply), `*Confirmed` mutations
//! that are deliberate no-ops, and `*Failed` mutations that carry whatever
//! the rollback needs.

pub mod cart;
pub mod wishlist;

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use tidepool_core::{CurrencyCode, LineItem, ProductId, WishlistEntry};

pub use cart::CartMutation;
pub use wishlist::WishlistMutation;

/// Bookkeeping for one synchronized collection.
///
/// `items` is the single source of truth for membership: a product is in
/// the collection exactly when its id is a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionState<T> {
    /// Records keyed by product id.
    pub items: HashMap<ProductId, T>,
    /// Ids removed while signed out, replayed as deletes at login so a
    /// stale remote copy cannot resurrect them.
    pub pending_removals: HashSet<ProductId>,
    /// True while a fetch of the authoritative remote list is in flight.
    pub loading: bool,
    /// True while the login merge is in flight.
    pub syncing: bool,
    /// Last whole-collection failure, cleared on the next fetch.
    pub error: Option<String>,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
            pending_removals: HashSet::new(),
            loading: false,
            syncing: false,
            error: None,
        }
    }
}

impl<T> CollectionState<T> {
    /// Number of distinct products in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the collection holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Membership check by key presence.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.items.contains_key(&id)
    }
}

/// The complete observable state: both collections plus display currency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorefrontState {
    pub cart: CollectionState<LineItem>,
    pub wishlist: CollectionState<WishlistEntry>,
    pub currency: CurrencyCode,
}

impl StorefrontState {
    /// Cart subtotal in the display currency.
    ///
    /// Lines without a price in any usable currency contribute nothing.
    #[must_use]
    pub fn cart_subtotal(&self) -> Decimal {
        self.cart
            .items
            .values()
            .filter_map(|item| item.line_total(self.currency))
            .sum()
    }

    /// Total units across all cart lines.
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.cart.items.values().map(|item| item.quantity).sum()
    }
}

/// A state transition. The only way state changes.
#[derive(Debug, Clone)]
pub enum Mutation {
    Cart(CartMutation),
    Wishlist(WishlistMutation),
    SetCurrency(CurrencyCode),
}

/// Apply one mutation. Pure, synchronous, never blocks.
pub fn reduce(state: &mut StorefrontState, mutation: Mutation) {
    match mutation {
        Mutation::Cart(m) => cart::reduce(&mut state.cart, m),
        Mutation::Wishlist(m) => wishlist::reduce(&mut state.wishlist, m),
        Mutation::SetCurrency(currency) => state.currency = currency,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tidepool_core::PriceTable;

    use super::*;

    fn item(id: i64, usd: i64, quantity: u32) -> LineItem {
        LineItem {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            prices: PriceTable::new().with(CurrencyCode::USD, Decimal::new(usd, 0)),
            image_url: None,
            quantity,
        }
    }

    #[test]
    fn test_cart_subtotal_sums_line_totals() {
        let mut state = StorefrontState::default();
        reduce(
            &mut state,
            Mutation::Cart(CartMutation::FetchSucceeded {
                items: vec![item(1, 10, 2), item(2, 5, 1)],
            }),
        );

        assert_eq!(state.cart_subtotal(), Decimal::new(25, 0));
        assert_eq!(state.cart_count(), 3);
    }

    #[test]
    fn test_set_currency() {
        let mut state = StorefrontState::default();
        reduce(&mut state, Mutation::SetCurrency(CurrencyCode::EUR));
        assert_eq!(state.currency, CurrencyCode::EUR);
    }
}
