//! Tidepool Sync - optimistic cart and wishlist synchronization.
//!
//! Every user intent is applied to local state immediately, then reconciled
//! with the remote collection API in the background:
//!
//! - signed out, mutations stay local (guest mode) and survive restarts;
//! - signed in, each mutation is pushed remotely and rolled back with a
//!   compensating mutation if the push fails;
//! - at login, guest-accumulated state is pushed in bulk and the server
//!   copy then wins (the Login Merge).
//!
//! # Architecture
//!
//! - [`store::StateStore`] - the observable state cell; all mutation flows
//!   through its reducer, and every transition is mirrored to the
//!   persistent local store
//! - [`engine::SyncEngine`] - one async handler per intent: optimistic
//!   apply, authentication check, remote call, compensator on failure
//! - [`api`] - the `/api/{collection}` HTTP contract behind trait seams so
//!   tests can substitute fakes
//! - [`auth`] - the "is there a valid session?" boundary query
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use tidepool_sync::api::{ApiClient, HttpCartApi, HttpWishlistApi};
//! use tidepool_sync::auth::SessionStore;
//! use tidepool_sync::config::SyncConfig;
//! use tidepool_sync::engine::{EngineDeps, EngineOptions, SyncEngine};
//! use tidepool_sync::notify::TracingNotifier;
//! use tidepool_sync::persist::JsonFileStore;
//! use tidepool_sync::store::StateStore;
//!
//! let config = SyncConfig::from_env()?;
//! let sessions = Arc::new(SessionStore::new());
//! let client = ApiClient::new(&config, Arc::clone(&sessions));
//!
//! let engine = SyncEngine::new(EngineDeps {
//!     store: StateStore::new(Arc::new(JsonFileStore::new(&config.state_path))),
//!     cart_api: Arc::new(HttpCartApi::new(client.clone())),
//!     wishlist_api: Arc::new(HttpWishlistApi::new(client)),
//!     auth: sessions,
//!     notifier: Arc::new(TracingNotifier),
//!     options: EngineOptions::default(),
//! });
//!
//! engine.add_to_cart(item).await;   // instant locally, synced behind the scenes
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod persist;
pub mod state;
pub mod store;

pub use engine::{EngineDeps, EngineOptions, SyncEngine};
pub use error::SyncError;
pub use store::StateStore;
