//! The synchronization engine - one async handler per user intent.
//!
//! Every handler follows the same shape: apply the optimistic mutation,
//! consult the authentication oracle, and either stop there (guest mode)
//! or push the change to the remote API, dispatching the compensating
//! mutation if the push fails. Handlers never return errors; failure
//! surfaces as a state rollback plus one notice.

mod cart;
mod merge;
mod wishlist;

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tidepool_core::{CurrencyCode, ProductId};
use tokio::sync::OwnedMutexGuard;

use crate::api::{CartApi, WishlistApi};
use crate::auth::AuthOracle;
use crate::error::SyncError;
use crate::notify::{Notice, Notifier};
use crate::state::{Mutation, StorefrontState};
use crate::store::StateStore;

/// Collaborators the engine is built from.
///
/// Everything behind a seam is a trait object so tests wire in fakes.
pub struct EngineDeps {
    pub store: StateStore,
    pub cart_api: Arc<dyn CartApi>,
    pub wishlist_api: Arc<dyn WishlistApi>,
    pub auth: Arc<dyn AuthOracle>,
    pub notifier: Arc<dyn Notifier>,
    pub options: EngineOptions,
}

/// Engine tunables.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Minimum time the loading flag stays raised on fetch paths, so a
    /// fast response does not flash the spinner. Mutation intents never
    /// pause.
    pub min_loading_pause: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            min_loading_pause: Duration::from_millis(250),
        }
    }
}

impl EngineOptions {
    /// No artificial pause. For tests and non-interactive callers.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            min_loading_pause: Duration::ZERO,
        }
    }
}

/// Lazily-populated per-product locks.
///
/// Intents for the same product serialize whole-intent (optimistic apply
/// through terminal transition); distinct products proceed concurrently.
#[derive(Default)]
struct ItemLocks {
    locks: Mutex<HashMap<ProductId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ItemLocks {
    async fn acquire(&self, id: ProductId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id).or_default())
        };
        lock.lock_owned().await
    }
}

// =============================================================================
// SyncEngine
// =============================================================================

/// The synchronization engine.
///
/// Cheap to clone; clones share state, collaborators, and locks.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    store: StateStore,
    cart_api: Arc<dyn CartApi>,
    wishlist_api: Arc<dyn WishlistApi>,
    auth: Arc<dyn AuthOracle>,
    notifier: Arc<dyn Notifier>,
    options: EngineOptions,
    cart_locks: ItemLocks,
    wishlist_locks: ItemLocks,
    // Whole-collection operations (clear, fetch, merge) serialize here.
    cart_collection_lock: tokio::sync::Mutex<()>,
    wishlist_collection_lock: tokio::sync::Mutex<()>,
    merge_in_flight: AtomicBool,
}

impl SyncEngine {
    #[must_use]
    pub fn new(deps: EngineDeps) -> Self {
        let EngineDeps {
            store,
            cart_api,
            wishlist_api,
            auth,
            notifier,
            options,
        } = deps;

        Self {
            inner: Arc::new(EngineInner {
                store,
                cart_api,
                wishlist_api,
                auth,
                notifier,
                options,
                cart_locks: ItemLocks::default(),
                wishlist_locks: ItemLocks::default(),
                cart_collection_lock: tokio::sync::Mutex::new(()),
                wishlist_collection_lock: tokio::sync::Mutex::new(()),
                merge_in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// The injected state store, for subscribing and reading.
    #[must_use]
    pub fn store(&self) -> &StateStore {
        &self.inner.store
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> StorefrontState {
        self.inner.store.state()
    }

    /// Switch the display currency. Purely local; prices re-render from
    /// the per-item price tables, nothing is pushed remotely.
    pub fn set_currency(&self, currency: CurrencyCode) {
        self.inner.store.dispatch(Mutation::SetCurrency(currency));
    }

    // ===== Shared plumbing =====

    fn dispatch(&self, mutation: Mutation) {
        self.inner.store.dispatch(mutation);
    }

    fn signed_in(&self) -> bool {
        self.inner.auth.has_valid_session()
    }

    fn notify(&self, notice: Notice) {
        self.inner.notifier.notify(notice);
    }

    /// Rollback already happened; log and tell the user.
    fn report_failure(&self, error: &SyncError) {
        tracing::warn!(
            collection = %error.collection(),
            error = %error,
            "remote sync failed, optimistic change rolled back"
        );
        self.notify(Notice::error(error.collection(), error.user_message()));
    }

    async fn loading_pause(&self) {
        let pause = self.inner.options.min_loading_pause;
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
