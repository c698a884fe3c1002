//! Wishlist intent handlers.

use tidepool_core::{CollectionKind, ProductId, WishlistEntry};
use tracing::instrument;

use crate::error::SyncError;
use crate::notify::Notice;
use crate::state::{Mutation, WishlistMutation};

use super::SyncEngine;

impl SyncEngine {
    /// Add a product to the wishlist. Adding a product that is already
    /// wishlisted succeeds and changes nothing.
    #[instrument(skip(self, entry), fields(id = %entry.id))]
    pub async fn add_to_wishlist(&self, entry: WishlistEntry) {
        let id = entry.id;
        let _guard = self.inner.wishlist_locks.acquire(id).await;

        // Whether the apply will insert decides whether a failure deletes.
        let was_present = self.state().wishlist.contains(id);

        self.dispatch(Mutation::Wishlist(WishlistMutation::AddRequested { entry }));

        if !self.signed_in() {
            self.dispatch(Mutation::Wishlist(WishlistMutation::AddConfirmed { id }));
            self.notify(Notice::success(CollectionKind::Wishlist, "Added to wishlist"));
            return;
        }

        match self.inner.wishlist_api.add_one(id).await {
            Ok(()) => {
                self.dispatch(Mutation::Wishlist(WishlistMutation::AddConfirmed { id }));
                self.notify(Notice::success(CollectionKind::Wishlist, "Added to wishlist"));
            }
            Err(err) => {
                if !was_present {
                    self.dispatch(Mutation::Wishlist(WishlistMutation::AddFailed { id }));
                }
                self.report_failure(&SyncError::Add(CollectionKind::Wishlist, err));
            }
        }
    }

    /// Flip wishlist membership: absent becomes present, present becomes
    /// absent.
    #[instrument(skip(self, entry), fields(id = %entry.id))]
    pub async fn toggle_wishlist(&self, entry: WishlistEntry) {
        let id = entry.id;
        let _guard = self.inner.wishlist_locks.acquire(id).await;

        // Capture the record a removing toggle is about to destroy.
        let prior = self.state().wishlist.items.get(&id).cloned();

        self.dispatch(Mutation::Wishlist(WishlistMutation::ToggleRequested { entry }));

        // The reducer already flipped membership; present now means the
        // toggle was an add.
        let added = self.state().wishlist.contains(id);

        if !self.signed_in() {
            if added {
                self.dispatch(Mutation::Wishlist(WishlistMutation::AddConfirmed { id }));
                self.notify(Notice::success(CollectionKind::Wishlist, "Added to wishlist"));
            } else {
                self.dispatch(Mutation::Wishlist(WishlistMutation::RemovalsDeferred {
                    ids: vec![id],
                }));
                self.dispatch(Mutation::Wishlist(WishlistMutation::RemoveConfirmed { id }));
                self.notify(Notice::success(CollectionKind::Wishlist, "Removed from wishlist"));
            }
            return;
        }

        if added {
            match self.inner.wishlist_api.add_one(id).await {
                Ok(()) => {
                    self.dispatch(Mutation::Wishlist(WishlistMutation::AddConfirmed { id }));
                    self.notify(Notice::success(CollectionKind::Wishlist, "Added to wishlist"));
                }
                Err(err) => {
                    self.dispatch(Mutation::Wishlist(WishlistMutation::AddFailed { id }));
                    self.report_failure(&SyncError::Add(CollectionKind::Wishlist, err));
                }
            }
        } else {
            match self.inner.wishlist_api.remove_one(id).await {
                Ok(()) => {
                    self.dispatch(Mutation::Wishlist(WishlistMutation::RemoveConfirmed { id }));
                    self.notify(Notice::success(CollectionKind::Wishlist, "Removed from wishlist"));
                }
                Err(err) => {
                    if let Some(entry) = prior {
                        self.dispatch(Mutation::Wishlist(WishlistMutation::RemoveFailed { entry }));
                    }
                    self.report_failure(&SyncError::Remove(CollectionKind::Wishlist, err));
                }
            }
        }
    }

    /// Remove a product from the wishlist.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove_from_wishlist(&self, id: ProductId) {
        let _guard = self.inner.wishlist_locks.acquire(id).await;

        let Some(prior) = self.state().wishlist.items.get(&id).cloned() else {
            return;
        };

        self.dispatch(Mutation::Wishlist(WishlistMutation::RemoveRequested { id }));

        if !self.signed_in() {
            self.dispatch(Mutation::Wishlist(WishlistMutation::RemovalsDeferred { ids: vec![id] }));
            self.dispatch(Mutation::Wishlist(WishlistMutation::RemoveConfirmed { id }));
            self.notify(Notice::success(CollectionKind::Wishlist, "Removed from wishlist"));
            return;
        }

        match self.inner.wishlist_api.remove_one(id).await {
            Ok(()) => {
                self.dispatch(Mutation::Wishlist(WishlistMutation::RemoveConfirmed { id }));
                self.notify(Notice::success(CollectionKind::Wishlist, "Removed from wishlist"));
            }
            Err(err) => {
                self.dispatch(Mutation::Wishlist(WishlistMutation::RemoveFailed { entry: prior }));
                self.report_failure(&SyncError::Remove(CollectionKind::Wishlist, err));
            }
        }
    }

    /// Empty the wishlist.
    #[instrument(skip(self))]
    pub async fn clear_wishlist(&self) {
        let _guard = self.inner.wishlist_collection_lock.lock().await;

        let snapshot: Vec<WishlistEntry> = self.state().wishlist.items.values().cloned().collect();
        if snapshot.is_empty() {
            return;
        }

        self.dispatch(Mutation::Wishlist(WishlistMutation::ClearRequested));

        if !self.signed_in() {
            let ids = snapshot.iter().map(|entry| entry.id).collect();
            self.dispatch(Mutation::Wishlist(WishlistMutation::RemovalsDeferred { ids }));
            self.notify(Notice::success(CollectionKind::Wishlist, "Wishlist cleared"));
            return;
        }

        match self.inner.wishlist_api.clear_all().await {
            Ok(()) => {
                self.dispatch(Mutation::Wishlist(WishlistMutation::ClearConfirmed));
                self.notify(Notice::success(CollectionKind::Wishlist, "Wishlist cleared"));
            }
            Err(err) => {
                let error = SyncError::Clear(CollectionKind::Wishlist, err);
                self.dispatch(Mutation::Wishlist(WishlistMutation::ClearFailed {
                    entries: snapshot,
                    error: error.to_string(),
                }));
                self.report_failure(&error);
            }
        }
    }

    /// Replace the local wishlist with the authoritative remote copy.
    ///
    /// Signed out this is a no-op: local state already is the truth.
    #[instrument(skip(self))]
    pub async fn refresh_wishlist(&self) {
        if !self.signed_in() {
            return;
        }

        let _guard = self.inner.wishlist_collection_lock.lock().await;

        self.dispatch(Mutation::Wishlist(WishlistMutation::FetchStarted));
        self.loading_pause().await;

        match self.inner.wishlist_api.fetch_all().await {
            Ok(entries) => {
                self.dispatch(Mutation::Wishlist(WishlistMutation::FetchSucceeded { entries }));
            }
            Err(err) => {
                let error = SyncError::Fetch(CollectionKind::Wishlist, err);
                self.dispatch(Mutation::Wishlist(WishlistMutation::FetchFailed {
                    error: error.to_string(),
                }));
                self.report_failure(&error);
            }
        }
    }
}
