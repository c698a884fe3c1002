//! Wishlist mutations and their reducer.
//!
//! Same shape as the cart minus quantities, plus the toggle: membership is
//! binary, keyed by id.

use tidepool_core::{ProductId, WishlistEntry};

use super::CollectionState;

/// Wishlist state transitions.
#[derive(Debug, Clone)]
pub enum WishlistMutation {
    /// Insert the entry (no-op if already present) and clear the id from
    /// `pending_removals`.
    AddRequested { entry: WishlistEntry },
    AddConfirmed { id: ProductId },
    /// Delete the entry a failed add inserted.
    AddFailed { id: ProductId },
    RemoveRequested { id: ProductId },
    RemoveConfirmed { id: ProductId },
    /// Re-insert the exact entry the remove destroyed.
    RemoveFailed { entry: WishlistEntry },
    /// Flip membership. The engine reads post-apply presence and inverts
    /// it to learn what the toggle actually did.
    ToggleRequested { entry: WishlistEntry },
    ClearRequested,
    ClearConfirmed,
    ClearFailed {
        entries: Vec<WishlistEntry>,
        error: String,
    },
    FetchStarted,
    FetchSucceeded { entries: Vec<WishlistEntry> },
    FetchFailed { error: String },
    SyncStarted,
    SyncFinished { error: Option<String> },
    RemovalsDeferred { ids: Vec<ProductId> },
}

/// Apply one wishlist mutation in place.
pub fn reduce(wishlist: &mut CollectionState<WishlistEntry>, mutation: WishlistMutation) {
    match mutation {
        WishlistMutation::AddRequested { entry } => {
            wishlist.pending_removals.remove(&entry.id);
            wishlist.items.entry(entry.id).or_insert(entry);
        }
        WishlistMutation::AddFailed { id } => {
            wishlist.items.remove(&id);
        }
        WishlistMutation::RemoveRequested { id } => {
            wishlist.items.remove(&id);
        }
        WishlistMutation::RemoveFailed { entry } => {
            wishlist.items.insert(entry.id, entry);
        }
        WishlistMutation::ToggleRequested { entry } => {
            if wishlist.items.remove(&entry.id).is_none() {
                wishlist.pending_removals.remove(&entry.id);
                wishlist.items.insert(entry.id, entry);
            }
        }
        WishlistMutation::ClearRequested => {
            wishlist.items.clear();
        }
        WishlistMutation::ClearConfirmed => {
            wishlist.pending_removals.clear();
        }
        WishlistMutation::ClearFailed { entries, error } => {
            wishlist.items = entries.into_iter().map(|entry| (entry.id, entry)).collect();
            wishlist.error = Some(error);
        }
        WishlistMutation::FetchStarted => {
            wishlist.loading = true;
            wishlist.error = None;
        }
        WishlistMutation::FetchSucceeded { entries } => {
            wishlist.items = entries.into_iter().map(|entry| (entry.id, entry)).collect();
            wishlist.loading = false;
            wishlist.error = None;
        }
        WishlistMutation::FetchFailed { error } => {
            wishlist.loading = false;
            wishlist.error = Some(error);
        }
        WishlistMutation::SyncStarted => {
            wishlist.syncing = true;
        }
        WishlistMutation::SyncFinished { error } => {
            wishlist.syncing = false;
            if error.is_none() {
                wishlist.pending_removals.clear();
            }
            wishlist.error = error;
        }
        WishlistMutation::RemovalsDeferred { ids } => {
            wishlist.pending_removals.extend(ids);
        }
        WishlistMutation::AddConfirmed { .. } | WishlistMutation::RemoveConfirmed { .. } => {}
    }
}
