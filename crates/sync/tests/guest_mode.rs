//! Guest mode: signed out, every operation is fully local.
//!
//! The contract under test: no remote call is ever attempted, optimistic
//! results stick, removals are deferred for the next login, and state
//! survives a restart through the persistent store.

mod common;

use std::sync::Arc;

use tidepool_core::ProductId;
use tidepool_sync::notify::Severity;
use tidepool_sync::persist::LocalStore;
use tidepool_sync::store::StateStore;

use common::{Harness, line_item, wishlist_entry};

#[tokio::test]
async fn test_guest_add_makes_no_api_calls() {
    let h = Harness::signed_out();

    h.engine.add_to_cart(line_item(7, 1800)).await;

    let state = h.engine.state();
    assert_eq!(state.cart.items.get(&ProductId::new(7)).map(|i| i.quantity), Some(1));
    assert!(h.cart_api.calls().is_empty());
}

#[tokio::test]
async fn test_guest_operations_touch_neither_api() {
    let h = Harness::signed_out();

    h.engine.add_to_cart(line_item(7, 1800)).await;
    h.engine.add_to_cart(line_item(7, 1800)).await;
    h.engine.set_cart_quantity(ProductId::new(7), 5).await;
    h.engine.toggle_wishlist(wishlist_entry(3)).await;
    h.engine.remove_from_cart(ProductId::new(7)).await;
    h.engine.clear_wishlist().await;

    assert!(h.cart_api.calls().is_empty());
    assert!(h.wishlist_api.calls().is_empty());
}

#[tokio::test]
async fn test_guest_remove_defers_removal() {
    let h = Harness::signed_out();
    h.engine.add_to_cart(line_item(7, 1800)).await;
    h.engine.add_to_cart(line_item(9, 900)).await;

    h.engine.remove_from_cart(ProductId::new(7)).await;

    let state = h.engine.state();
    assert!(!state.cart.contains(ProductId::new(7)));
    assert!(state.cart.pending_removals.contains(&ProductId::new(7)));
    assert!(state.cart.contains(ProductId::new(9)));
}

#[tokio::test]
async fn test_guest_clear_defers_every_removal() {
    let h = Harness::signed_out();
    h.engine.add_to_cart(line_item(7, 1800)).await;
    h.engine.add_to_cart(line_item(9, 900)).await;

    h.engine.clear_cart().await;

    let state = h.engine.state();
    assert!(state.cart.is_empty());
    assert!(state.cart.pending_removals.contains(&ProductId::new(7)));
    assert!(state.cart.pending_removals.contains(&ProductId::new(9)));
}

#[tokio::test]
async fn test_guest_re_add_cancels_deferred_removal() {
    let h = Harness::signed_out();
    h.engine.add_to_cart(line_item(7, 1800)).await;
    h.engine.remove_from_cart(ProductId::new(7)).await;

    h.engine.add_to_cart(line_item(7, 1800)).await;

    let state = h.engine.state();
    assert!(state.cart.contains(ProductId::new(7)));
    assert!(state.cart.pending_removals.is_empty());
}

#[tokio::test]
async fn test_guest_wishlist_toggle_off_defers_removal() {
    let h = Harness::signed_out();
    h.engine.toggle_wishlist(wishlist_entry(3)).await;
    h.engine.toggle_wishlist(wishlist_entry(3)).await;

    let state = h.engine.state();
    assert!(!state.wishlist.contains(ProductId::new(3)));
    assert!(state.wishlist.pending_removals.contains(&ProductId::new(3)));
    assert!(h.wishlist_api.calls().is_empty());
}

#[tokio::test]
async fn test_guest_refresh_is_a_noop() {
    let h = Harness::signed_out();

    h.engine.refresh_cart().await;
    h.engine.refresh_wishlist().await;

    let state = h.engine.state();
    assert!(!state.cart.loading);
    assert!(!state.wishlist.loading);
    assert!(h.cart_api.calls().is_empty());
    assert!(h.wishlist_api.calls().is_empty());
}

#[tokio::test]
async fn test_guest_state_survives_restart() {
    let h = Harness::signed_out();
    h.engine.add_to_cart(line_item(7, 1800)).await;
    h.engine.add_to_cart(line_item(7, 1800)).await;
    h.engine.remove_from_cart(ProductId::new(9)).await; // no-op, not in cart
    h.engine.toggle_wishlist(wishlist_entry(3)).await;

    // A fresh store over the same persistence is "the next visit".
    let restored = StateStore::new(Arc::clone(&h.persist) as Arc<dyn LocalStore>);
    let state = restored.state();

    assert_eq!(state.cart.items.get(&ProductId::new(7)).map(|i| i.quantity), Some(2));
    assert!(state.wishlist.contains(ProductId::new(3)));
}

#[tokio::test]
async fn test_guest_add_still_notifies() {
    let h = Harness::signed_out();

    h.engine.add_to_cart(line_item(7, 1800)).await;

    let notices = h.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices.first().map(|n| n.severity), Some(Severity::Success));
}
