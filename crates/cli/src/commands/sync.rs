//! Login merge: push guest state, then let the server win.

use super::engine_from_env;
use super::show::{collection_error, print_state};

/// Push locally accumulated items to the signed-in account, replay deferred
/// removals, then re-fetch both collections as the source of truth.
///
/// # Errors
///
/// Returns an error if no session token is configured, environment
/// configuration is missing, or the merge finishes with a failure on
/// either collection.
pub async fn login_merge() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    if std::env::var("TIDEPOOL_SESSION_TOKEN").is_err() {
        return Err("TIDEPOOL_SESSION_TOKEN not set; sign in before syncing".into());
    }

    let engine = engine_from_env()?;

    engine.handle_session_established().await;

    let state = engine.state();
    print_state(&state);

    if let Some(error) = collection_error(&state) {
        return Err(format!("merge finished with errors: {error}").into());
    }
    Ok(())
}
