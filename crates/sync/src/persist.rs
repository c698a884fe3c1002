//! Durable local snapshots of cart and wishlist state.
//!
//! The store mirrors every reducer transition write-through and reads the
//! snapshot exactly once, at startup hydration. Persistence is synchronous
//! by design: a transition is durable by the time `dispatch` returns.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tidepool_core::{CurrencyCode, LineItem, ProductId, WishlistEntry};

use crate::state::{CollectionState, StorefrontState};

/// Default snapshot location; doubles as the fixed storage key.
pub const DEFAULT_STATE_PATH: &str = "tidepool.storefront.v1.json";

/// Errors reading or writing the snapshot.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable client-side storage for the state snapshot.
pub trait LocalStore: Send + Sync {
    /// Read the snapshot; `None` when nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage is unreadable or holds a
    /// snapshot that no longer parses.
    fn load(&self) -> Result<Option<PersistedState>, PersistError>;

    /// Replace the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot cannot be written.
    fn save(&self, snapshot: &PersistedState) -> Result<(), PersistError>;
}

/// The serialized blob written on every state transition.
///
/// Flags (`loading`, `syncing`, `error`) are in-flight markers, not durable
/// facts, so they are not part of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub cart_items: Vec<LineItem>,
    pub wishlist_items: Vec<WishlistEntry>,
    pub cart_pending_removals: Vec<ProductId>,
    pub wishlist_pending_removals: Vec<ProductId>,
    pub currency: CurrencyCode,
}

impl From<&StorefrontState> for PersistedState {
    fn from(state: &StorefrontState) -> Self {
        Self {
            cart_items: state.cart.items.values().cloned().collect(),
            wishlist_items: state.wishlist.items.values().cloned().collect(),
            cart_pending_removals: state.cart.pending_removals.iter().copied().collect(),
            wishlist_pending_removals: state.wishlist.pending_removals.iter().copied().collect(),
            currency: state.currency,
        }
    }
}

impl PersistedState {
    /// Rebuild live state from the snapshot.
    #[must_use]
    pub fn into_state(self) -> StorefrontState {
        StorefrontState {
            cart: CollectionState {
                items: self.cart_items.into_iter().map(|item| (item.id, item)).collect(),
                pending_removals: self.cart_pending_removals.into_iter().collect(),
                ..CollectionState::default()
            },
            wishlist: CollectionState {
                items: self
                    .wishlist_items
                    .into_iter()
                    .map(|entry| (entry.id, entry))
                    .collect(),
                pending_removals: self.wishlist_pending_removals.into_iter().collect(),
                ..CollectionState::default()
            },
            currency: self.currency,
        }
    }
}

/// Snapshot persistence to a JSON file.
///
/// Writes go to a sibling temp file first, then rename into place, so a
/// crash mid-write never corrupts the previous snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LocalStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedState>, PersistError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, snapshot: &PersistedState) -> Result<(), PersistError> {
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(snapshot)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory snapshot store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<PersistedState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last saved snapshot, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<PersistedState> {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LocalStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedState>, PersistError> {
        Ok(self.snapshot())
    }

    fn save(&self, snapshot: &PersistedState) -> Result<(), PersistError> {
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        Ok(())
    }
}
