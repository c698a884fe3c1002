//! The login merge: push guest state in bulk, then trust the server.

use std::sync::atomic::Ordering;

use tidepool_core::{CartLine, CollectionKind, ProductId};
use tracing::instrument;

use crate::error::SyncError;
use crate::notify::Notice;
use crate::state::{CartMutation, Mutation, WishlistMutation};

use super::SyncEngine;

impl SyncEngine {
    /// Run the login merge. Call once per "no session" to "valid session"
    /// transition; overlapping calls are dropped.
    ///
    /// Per collection, cart first: push guest-accumulated items in one
    /// bulk add, replay deferred guest removals as a bulk remove, then
    /// re-fetch the authoritative remote copy, which wins outright. There
    /// is no client-side three-way merge. Pushes are best-effort: the
    /// re-fetch runs even after a failed push so local and remote cannot
    /// stay permanently diverged.
    #[instrument(skip(self))]
    pub async fn handle_session_established(&self) {
        // Race guard: the session may already be gone again.
        if !self.signed_in() {
            return;
        }
        if self.inner.merge_in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("login merge already in flight, skipping");
            return;
        }

        self.merge_cart().await;
        self.merge_wishlist().await;

        self.inner.merge_in_flight.store(false, Ordering::SeqCst);
    }

    async fn merge_cart(&self) {
        let _guard = self.inner.cart_collection_lock.lock().await;

        self.dispatch(Mutation::Cart(CartMutation::SyncStarted));

        let state = self.state();
        let lines: Vec<CartLine> = state
            .cart
            .items
            .values()
            .map(|item| CartLine {
                product_id: item.id,
                quantity: item.quantity,
            })
            .collect();
        let removals: Vec<ProductId> = state.cart.pending_removals.iter().copied().collect();

        let mut push_error: Option<SyncError> = None;

        if !lines.is_empty()
            && let Err(err) = self.inner.cart_api.add_bulk(&lines).await
        {
            push_error = Some(SyncError::Bulk(CollectionKind::Cart, err));
        }
        if !removals.is_empty()
            && let Err(err) = self.inner.cart_api.remove_bulk(&removals).await
        {
            push_error.get_or_insert(SyncError::Remove(CollectionKind::Cart, err));
        }

        let fetch_error = match self.inner.cart_api.fetch_all().await {
            Ok(items) => {
                self.dispatch(Mutation::Cart(CartMutation::FetchSucceeded { items }));
                None
            }
            Err(err) => Some(SyncError::Fetch(CollectionKind::Cart, err)),
        };

        // A clean finish also clears the deferred-removal set (reducer).
        let error = push_error.or(fetch_error);
        self.dispatch(Mutation::Cart(CartMutation::SyncFinished {
            error: error.as_ref().map(ToString::to_string),
        }));

        match error {
            Some(error) => {
                tracing::warn!(error = %error, "cart merge incomplete");
                self.notify(Notice::warning(CollectionKind::Cart, error.user_message()));
            }
            None if lines.is_empty() => {}
            None => {
                self.notify(Notice::success(
                    CollectionKind::Cart,
                    format!("Synced {} cart item(s) to your account", lines.len()),
                ));
            }
        }
    }

    async fn merge_wishlist(&self) {
        let _guard = self.inner.wishlist_collection_lock.lock().await;

        self.dispatch(Mutation::Wishlist(WishlistMutation::SyncStarted));

        let state = self.state();
        let ids: Vec<ProductId> = state.wishlist.items.keys().copied().collect();
        let removals: Vec<ProductId> = state.wishlist.pending_removals.iter().copied().collect();

        let mut push_error: Option<SyncError> = None;

        if !ids.is_empty()
            && let Err(err) = self.inner.wishlist_api.add_bulk(&ids).await
        {
            push_error = Some(SyncError::Bulk(CollectionKind::Wishlist, err));
        }
        if !removals.is_empty()
            && let Err(err) = self.inner.wishlist_api.remove_bulk(&removals).await
        {
            push_error.get_or_insert(SyncError::Remove(CollectionKind::Wishlist, err));
        }

        let fetch_error = match self.inner.wishlist_api.fetch_all().await {
            Ok(entries) => {
                self.dispatch(Mutation::Wishlist(WishlistMutation::FetchSucceeded { entries }));
                None
            }
            Err(err) => Some(SyncError::Fetch(CollectionKind::Wishlist, err)),
        };

        let error = push_error.or(fetch_error);
        self.dispatch(Mutation::Wishlist(WishlistMutation::SyncFinished {
            error: error.as_ref().map(ToString::to_string),
        }));

        match error {
            Some(error) => {
                tracing::warn!(error = %error, "wishlist merge incomplete");
                self.notify(Notice::warning(CollectionKind::Wishlist, error.user_message()));
            }
            None if ids.is_empty() => {}
            None => {
                self.notify(Notice::success(
                    CollectionKind::Wishlist,
                    format!("Synced {} wishlist item(s) to your account", ids.len()),
                ));
            }
        }
    }
}
