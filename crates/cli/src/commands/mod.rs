//! Command implementations for the Tidepool CLI.

pub mod cart;
pub mod show;
pub mod sync;
pub mod wishlist;

use std::sync::Arc;

use tidepool_sync::api::{ApiClient, HttpCartApi, HttpWishlistApi};
use tidepool_sync::auth::SessionStore;
use tidepool_sync::config::SyncConfig;
use tidepool_sync::engine::{EngineDeps, EngineOptions, SyncEngine};
use tidepool_sync::notify::TracingNotifier;
use tidepool_sync::persist::JsonFileStore;
use tidepool_sync::store::StateStore;

/// Wire a [`SyncEngine`] from environment configuration.
///
/// The session is seeded from `TIDEPOOL_SESSION_TOKEN` when present, so a
/// command runs signed in exactly when the environment carries a token.
///
/// # Errors
///
/// Returns an error if required environment variables are missing or fail
/// validation.
pub fn engine_from_env() -> Result<SyncEngine, Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = SyncConfig::from_env()?;

    let sessions = Arc::new(SessionStore::new());
    if let Some(session) = config.seed_session() {
        sessions.set_session(session);
    }

    let client = ApiClient::new(&config, Arc::clone(&sessions));

    Ok(SyncEngine::new(EngineDeps {
        store: StateStore::new(Arc::new(JsonFileStore::new(&config.state_path))),
        cart_api: Arc::new(HttpCartApi::new(client.clone())),
        wishlist_api: Arc::new(HttpWishlistApi::new(client)),
        auth: sessions,
        notifier: Arc::new(TracingNotifier),
        options: EngineOptions {
            min_loading_pause: config.loading_pause,
        },
    }))
}
