//! The observable state store handed to the engine and to consumers.

use std::sync::Arc;

use tokio::sync::watch;

use crate::persist::{LocalStore, PersistedState};
use crate::state::{Mutation, StorefrontState, reduce};

/// Dispatch-only state container with change notification.
///
/// Cheap to clone; clones share the same state. Consumers observe through
/// [`StateStore::subscribe`] or read a snapshot with [`StateStore::state`];
/// the engine (and nothing else) feeds transitions through
/// [`StateStore::dispatch`]. Every transition is written through to the
/// injected [`LocalStore`] before `dispatch` returns.
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<StateStoreInner>,
}

struct StateStoreInner {
    state_tx: watch::Sender<StorefrontState>,
    persist: Arc<dyn LocalStore>,
}

impl StateStore {
    /// Build the store, hydrating from the persisted snapshot.
    ///
    /// A missing snapshot starts empty; an unreadable one is logged and
    /// discarded rather than taking the storefront down.
    #[must_use]
    pub fn new(persist: Arc<dyn LocalStore>) -> Self {
        let initial = match persist.load() {
            Ok(Some(snapshot)) => snapshot.into_state(),
            Ok(None) => StorefrontState::default(),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable state snapshot");
                StorefrontState::default()
            }
        };

        let (state_tx, _) = watch::channel(initial);
        Self {
            inner: Arc::new(StateStoreInner { state_tx, persist }),
        }
    }

    /// A snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> StorefrontState {
        self.inner.state_tx.borrow().clone()
    }

    /// Watch for state changes. The receiver is primed with the current
    /// state and marked changed on every dispatch.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StorefrontState> {
        self.inner.state_tx.subscribe()
    }

    /// Apply one mutation and persist the result.
    ///
    /// Subscribers are notified even when the reducer leaves the state
    /// unchanged. A persistence failure is logged, never surfaced: the
    /// in-memory state is already correct and a later dispatch retries
    /// the write anyway.
    pub fn dispatch(&self, mutation: Mutation) {
        self.inner.state_tx.send_modify(|state| reduce(state, mutation));

        let snapshot = PersistedState::from(&*self.inner.state_tx.borrow());
        if let Err(err) = self.inner.persist.save(&snapshot) {
            tracing::warn!(error = %err, "failed to persist state snapshot");
        }
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &*self.inner.state_tx.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use tidepool_core::{CurrencyCode, LineItem, PriceTable, ProductId};

    use super::*;
    use crate::persist::MemoryStore;
    use crate::state::CartMutation;

    fn item(id: i64) -> LineItem {
        LineItem {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            prices: PriceTable::new().with(CurrencyCode::USD, Decimal::new(18, 0)),
            image_url: None,
            quantity: 1,
        }
    }

    #[test]
    fn test_dispatch_writes_through() {
        let persist = Arc::new(MemoryStore::new());
        let store = StateStore::new(Arc::clone(&persist) as Arc<dyn LocalStore>);

        store.dispatch(Mutation::Cart(CartMutation::AddRequested { item: item(7) }));

        assert!(store.state().cart.contains(ProductId::new(7)));
        let snapshot = persist.snapshot().unwrap();
        assert_eq!(snapshot.cart_items.len(), 1);
    }

    #[test]
    fn test_hydrates_from_snapshot() {
        let persist = Arc::new(MemoryStore::new());
        {
            let store = StateStore::new(Arc::clone(&persist) as Arc<dyn LocalStore>);
            store.dispatch(Mutation::Cart(CartMutation::AddRequested { item: item(7) }));
            store.dispatch(Mutation::SetCurrency(CurrencyCode::GBP));
        }

        let restored = StateStore::new(persist as Arc<dyn LocalStore>);
        let state = restored.state();
        assert!(state.cart.contains(ProductId::new(7)));
        assert_eq!(state.currency, CurrencyCode::GBP);
    }

    #[test]
    fn test_subscribers_see_dispatches() {
        let store = StateStore::new(Arc::new(MemoryStore::new()));
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        store.dispatch(Mutation::Cart(CartMutation::AddRequested { item: item(7) }));

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().cart.contains(ProductId::new(7)));
    }
}
