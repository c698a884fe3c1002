//! Cart mutations and their reducer.

use tidepool_core::{LineItem, ProductId};

use super::CollectionState;

/// Cart state transitions.
///
/// `*Requested` variants are the optimistic applies, `*Confirmed` variants
/// are deliberate no-ops (the optimistic result already holds), `*Failed`
/// variants are the compensators and carry whatever the rollback needs.
#[derive(Debug, Clone)]
pub enum CartMutation {
    /// Increment the line by one, or insert it with quantity 1.
    /// Also clears the id from `pending_removals`.
    AddRequested { item: LineItem },
    AddConfirmed { id: ProductId },
    /// `previous_quantity: None` means the add created the line (delete
    /// it); `Some(q)` restores the pre-add quantity.
    AddFailed {
        id: ProductId,
        previous_quantity: Option<u32>,
    },
    /// Delete the line. The prior record travels in the intent that
    /// produced this mutation, not in state.
    RemoveRequested { id: ProductId },
    RemoveConfirmed { id: ProductId },
    /// Re-insert the exact record the remove destroyed.
    RemoveFailed { item: LineItem },
    /// Set the quantity directly, iff positive and the line exists.
    UpdateQuantityRequested { id: ProductId, quantity: u32 },
    UpdateQuantityConfirmed { id: ProductId },
    /// Restore the pre-update quantity. Restoring to 0 deletes the line
    /// entirely; a zero-quantity record must never exist.
    UpdateQuantityFailed {
        id: ProductId,
        previous_quantity: u32,
    },
    /// Empty the cart. The engine snapshots the items beforehand.
    ClearRequested,
    /// Remote clear succeeded: nothing left remotely to resurrect, so the
    /// deferred-removal set empties too.
    ClearConfirmed,
    /// Restore the pre-clear snapshot and record the failure.
    ClearFailed { items: Vec<LineItem>, error: String },
    FetchStarted,
    /// Replace the items wholesale with the authoritative remote list.
    FetchSucceeded { items: Vec<LineItem> },
    FetchFailed { error: String },
    SyncStarted,
    /// Login merge finished. A clean finish clears `pending_removals`;
    /// a failed one keeps them for the next merge.
    SyncFinished { error: Option<String> },
    /// Guest-mode removals, deferred until login replays them remotely.
    RemovalsDeferred { ids: Vec<ProductId> },
}

/// Apply one cart mutation in place.
pub fn reduce(cart: &mut CollectionState<LineItem>, mutation: CartMutation) {
    match mutation {
        CartMutation::AddRequested { item } => {
            cart.pending_removals.remove(&item.id);
            if let Some(existing) = cart.items.get_mut(&item.id) {
                existing.quantity = existing.quantity.saturating_add(1);
            } else {
                let id = item.id;
                cart.items.insert(id, LineItem { quantity: 1, ..item });
            }
        }
        CartMutation::AddFailed {
            id,
            previous_quantity,
        } => match previous_quantity {
            None => {
                cart.items.remove(&id);
            }
            Some(quantity) => {
                if let Some(existing) = cart.items.get_mut(&id) {
                    existing.quantity = quantity;
                }
            }
        },
        CartMutation::RemoveRequested { id } => {
            cart.items.remove(&id);
        }
        CartMutation::RemoveFailed { item } => {
            cart.items.insert(item.id, item);
        }
        CartMutation::UpdateQuantityRequested { id, quantity } => {
            if quantity > 0
                && let Some(existing) = cart.items.get_mut(&id)
            {
                existing.quantity = quantity;
            }
        }
        CartMutation::UpdateQuantityFailed {
            id,
            previous_quantity,
        } => {
            if previous_quantity == 0 {
                cart.items.remove(&id);
            } else if let Some(existing) = cart.items.get_mut(&id) {
                existing.quantity = previous_quantity;
            }
        }
        CartMutation::ClearRequested => {
            cart.items.clear();
        }
        CartMutation::ClearConfirmed => {
            cart.pending_removals.clear();
        }
        CartMutation::ClearFailed { items, error } => {
            cart.items = items.into_iter().map(|item| (item.id, item)).collect();
            cart.error = Some(error);
        }
        CartMutation::FetchStarted => {
            cart.loading = true;
            cart.error = None;
        }
        CartMutation::FetchSucceeded { items } => {
            cart.items = items.into_iter().map(|item| (item.id, item)).collect();
            cart.loading = false;
            cart.error = None;
        }
        CartMutation::FetchFailed { error } => {
            cart.loading = false;
            cart.error = Some(error);
        }
        CartMutation::SyncStarted => {
            cart.syncing = true;
        }
        CartMutation::SyncFinished { error } => {
            cart.syncing = false;
            if error.is_none() {
                cart.pending_removals.clear();
            }
            cart.error = error;
        }
        CartMutation::RemovalsDeferred { ids } => {
            cart.pending_removals.extend(ids);
        }
        // Confirmations are no-ops: the optimistic apply already holds.
        CartMutation::AddConfirmed { .. }
        | CartMutation::RemoveConfirmed { .. }
        | CartMutation::UpdateQuantityConfirmed { .. } => {}
    }
}
