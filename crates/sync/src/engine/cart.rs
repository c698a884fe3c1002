//! Cart intent handlers.

use tidepool_core::{CollectionKind, LineItem, ProductId};
use tracing::instrument;

use crate::error::SyncError;
use crate::notify::Notice;
use crate::state::{CartMutation, Mutation};

use super::SyncEngine;

impl SyncEngine {
    /// Add one unit of a product to the cart.
    ///
    /// `product.quantity` is ignored: a fresh line starts at 1, an
    /// existing line increments by 1.
    #[instrument(skip(self, product), fields(id = %product.id))]
    pub async fn add_to_cart(&self, product: LineItem) {
        let id = product.id;
        let _guard = self.inner.cart_locks.acquire(id).await;

        self.dispatch(Mutation::Cart(CartMutation::AddRequested { item: product }));

        // Post-apply quantity 1 means the apply created the line, so the
        // rollback is a delete rather than a quantity restore.
        let previous_quantity = match self.cart_quantity(id) {
            Some(1) | None => None,
            Some(quantity) => Some(quantity - 1),
        };

        if !self.signed_in() {
            self.dispatch(Mutation::Cart(CartMutation::AddConfirmed { id }));
            self.notify(Notice::success(CollectionKind::Cart, "Added to cart"));
            return;
        }

        match self.inner.cart_api.add_one(id, 1).await {
            Ok(()) => {
                self.dispatch(Mutation::Cart(CartMutation::AddConfirmed { id }));
                self.notify(Notice::success(CollectionKind::Cart, "Added to cart"));
            }
            Err(err) => {
                self.dispatch(Mutation::Cart(CartMutation::AddFailed { id, previous_quantity }));
                self.report_failure(&SyncError::Add(CollectionKind::Cart, err));
            }
        }
    }

    /// Remove a cart line entirely.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove_from_cart(&self, id: ProductId) {
        let _guard = self.inner.cart_locks.acquire(id).await;

        // The reducer destroys the record; capture it first or a failed
        // remove has nothing to restore.
        let Some(prior) = self.state().cart.items.get(&id).cloned() else {
            return;
        };

        self.dispatch(Mutation::Cart(CartMutation::RemoveRequested { id }));

        if !self.signed_in() {
            self.dispatch(Mutation::Cart(CartMutation::RemovalsDeferred { ids: vec![id] }));
            self.dispatch(Mutation::Cart(CartMutation::RemoveConfirmed { id }));
            self.notify(Notice::success(CollectionKind::Cart, "Removed from cart"));
            return;
        }

        match self.inner.cart_api.remove_one(id).await {
            Ok(()) => {
                self.dispatch(Mutation::Cart(CartMutation::RemoveConfirmed { id }));
                self.notify(Notice::success(CollectionKind::Cart, "Removed from cart"));
            }
            Err(err) => {
                self.dispatch(Mutation::Cart(CartMutation::RemoveFailed { item: prior }));
                self.report_failure(&SyncError::Remove(CollectionKind::Cart, err));
            }
        }
    }

    /// Set a cart line to an exact quantity.
    ///
    /// Quantity 0 means the line should not exist and is handled as a
    /// remove, so a zero-quantity record can never appear.
    #[instrument(skip(self), fields(id = %id, quantity))]
    pub async fn set_cart_quantity(&self, id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_from_cart(id).await;
            return;
        }

        let _guard = self.inner.cart_locks.acquire(id).await;

        let Some(previous_quantity) = self.cart_quantity(id) else {
            return;
        };

        self.dispatch(Mutation::Cart(CartMutation::UpdateQuantityRequested { id, quantity }));

        if !self.signed_in() {
            self.dispatch(Mutation::Cart(CartMutation::UpdateQuantityConfirmed { id }));
            self.notify(Notice::success(CollectionKind::Cart, "Cart updated"));
            return;
        }

        match self.inner.cart_api.update_quantity(id, quantity).await {
            Ok(()) => {
                self.dispatch(Mutation::Cart(CartMutation::UpdateQuantityConfirmed { id }));
                self.notify(Notice::success(CollectionKind::Cart, "Cart updated"));
            }
            Err(err) => {
                self.dispatch(Mutation::Cart(CartMutation::UpdateQuantityFailed {
                    id,
                    previous_quantity,
                }));
                self.report_failure(&SyncError::UpdateQuantity(CollectionKind::Cart, err));
            }
        }
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) {
        let _guard = self.inner.cart_collection_lock.lock().await;

        let snapshot: Vec<LineItem> = self.state().cart.items.values().cloned().collect();
        if snapshot.is_empty() {
            return;
        }

        self.dispatch(Mutation::Cart(CartMutation::ClearRequested));

        if !self.signed_in() {
            let ids = snapshot.iter().map(|item| item.id).collect();
            self.dispatch(Mutation::Cart(CartMutation::RemovalsDeferred { ids }));
            self.notify(Notice::success(CollectionKind::Cart, "Cart cleared"));
            return;
        }

        match self.inner.cart_api.clear_all().await {
            Ok(()) => {
                self.dispatch(Mutation::Cart(CartMutation::ClearConfirmed));
                self.notify(Notice::success(CollectionKind::Cart, "Cart cleared"));
            }
            Err(err) => {
                let error = SyncError::Clear(CollectionKind::Cart, err);
                self.dispatch(Mutation::Cart(CartMutation::ClearFailed {
                    items: snapshot,
                    error: error.to_string(),
                }));
                self.report_failure(&error);
            }
        }
    }

    /// Replace the local cart with the authoritative remote copy.
    ///
    /// Signed out this is a no-op: local state already is the truth.
    #[instrument(skip(self))]
    pub async fn refresh_cart(&self) {
        if !self.signed_in() {
            return;
        }

        let _guard = self.inner.cart_collection_lock.lock().await;

        self.dispatch(Mutation::Cart(CartMutation::FetchStarted));
        self.loading_pause().await;

        match self.inner.cart_api.fetch_all().await {
            Ok(items) => {
                self.dispatch(Mutation::Cart(CartMutation::FetchSucceeded { items }));
            }
            Err(err) => {
                let error = SyncError::Fetch(CollectionKind::Cart, err);
                self.dispatch(Mutation::Cart(CartMutation::FetchFailed {
                    error: error.to_string(),
                }));
                self.report_failure(&error);
            }
        }
    }

    fn cart_quantity(&self, id: ProductId) -> Option<u32> {
        self.state().cart.items.get(&id).map(|item| item.quantity)
    }
}
