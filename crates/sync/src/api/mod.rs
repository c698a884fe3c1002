//! HTTP client for the collection backend.
//!
//! Every endpoint speaks the same REST shape: one route per collection
//! (`/api/cart`, `/api/wishlist`), verbs for the operations, and a
//! `{success, data?, error?}` envelope on every response. The typed
//! traits the engine consumes live in [`cart`] and [`wishlist`].

pub mod cart;
pub mod wishlist;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tidepool_core::CollectionKind;

use crate::auth::SessionStore;
use crate::config::SyncConfig;

pub use cart::{CartApi, HttpCartApi};
pub use wishlist::{HttpWishlistApi, WishlistApi};

/// Errors from the collection backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure before any response arrived.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status line.
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// 2xx response whose envelope said `success: false`.
    #[error("server rejected the request: {0}")]
    Rejected(String),

    /// Response body that does not parse as an envelope.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// True for an HTTP 409, the backend's "already there" answer.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Status(409))
    }
}

/// The uniform response envelope.
///
/// `data` is only meaningful on fetches; mutations answer with `success`
/// alone. `error` accompanies `success: false`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Shared HTTP plumbing for both collection endpoints.
///
/// Attaches the service key header on every request and a bearer token
/// whenever a valid session is present.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    cart_endpoint: String,
    wishlist_endpoint: String,
    api_key: SecretString,
    sessions: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a new client against the configured backend.
    #[must_use]
    pub fn new(config: &SyncConfig, sessions: Arc<SessionStore>) -> Self {
        let base = config.api_url.as_str().trim_end_matches('/').to_owned();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                cart_endpoint: format!("{base}/api/{}", CollectionKind::Cart.as_str()),
                wishlist_endpoint: format!("{base}/api/{}", CollectionKind::Wishlist.as_str()),
                api_key: config.api_key.clone(),
                sessions,
            }),
        }
    }

    fn endpoint(&self, collection: CollectionKind) -> &str {
        match collection {
            CollectionKind::Cart => &self.inner.cart_endpoint,
            CollectionKind::Wishlist => &self.inner.wishlist_endpoint,
        }
    }

    /// Execute one request and decode the envelope.
    async fn execute<T: DeserializeOwned + Default>(
        &self,
        method: reqwest::Method,
        collection: CollectionKind,
        body: Option<serde_json::Value>,
    ) -> Result<Envelope<T>, ApiError> {
        let mut request = self
            .inner
            .client
            .request(method, self.endpoint(collection))
            .header("apikey", self.inner.api_key.expose_secret());

        if let Some(token) = self.inner.sessions.access_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                collection = %collection,
                body = %response_text.chars().take(500).collect::<String>(),
                "collection API returned non-success status"
            );
            return Err(ApiError::Status(status.as_u16()));
        }

        match serde_json::from_str(&response_text) {
            Ok(envelope) => Ok(envelope),
            Err(err) => {
                tracing::error!(
                    error = %err,
                    collection = %collection,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "failed to decode collection API response"
                );
                Err(ApiError::Decode(err))
            }
        }
    }

    /// A mutation: only the envelope verdict matters.
    pub(crate) async fn call(
        &self,
        method: reqwest::Method,
        collection: CollectionKind,
        body: Option<serde_json::Value>,
    ) -> Result<(), ApiError> {
        let envelope = self
            .execute::<serde_json::Value>(method, collection, body)
            .await?;
        if envelope.success {
            Ok(())
        } else {
            Err(ApiError::Rejected(envelope.error.unwrap_or_else(|| "unknown error".to_owned())))
        }
    }

    /// A fetch: the envelope must carry `data`.
    pub(crate) async fn fetch<T: DeserializeOwned + Default>(
        &self,
        collection: CollectionKind,
    ) -> Result<T, ApiError> {
        let envelope = self.execute::<T>(reqwest::Method::GET, collection, None).await?;
        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope.error.unwrap_or_else(|| "unknown error".to_owned()),
            ));
        }
        envelope.data.ok_or_else(|| ApiError::Rejected("response carried no data".to_owned()))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("cart_endpoint", &self.inner.cart_endpoint)
            .field("wishlist_endpoint", &self.inner.wishlist_endpoint)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_with_data() {
        let envelope: Envelope<Vec<i64>> =
            serde_json::from_str(r#"{"success":true,"data":[1,2,3]}"#).unwrap();

        assert!(envelope.success);
        assert_eq!(envelope.data.unwrap(), vec![1, 2, 3]);
        assert!(envelope.error.is_none());
    }

    #[test]
    fn test_envelope_failure() {
        let envelope: Envelope<Vec<i64>> =
            serde_json::from_str(r#"{"success":false,"error":"out of stock"}"#).unwrap();

        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.error.as_deref(), Some("out of stock"));
    }

    #[test]
    fn test_envelope_bare_success() {
        let envelope: Envelope<Vec<i64>> = serde_json::from_str(r#"{"success":true}"#).unwrap();

        assert!(envelope.success);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_conflict_detection() {
        assert!(ApiError::Status(409).is_conflict());
        assert!(!ApiError::Status(500).is_conflict());
        assert!(!ApiError::Rejected("conflict".to_owned()).is_conflict());
    }
}
