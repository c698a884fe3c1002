//! Typed wishlist operations over the collection backend.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tidepool_core::{CollectionKind, ProductId, WishlistEntry};
use tracing::instrument;

use super::{ApiClient, ApiError};

/// Remote wishlist operations as the engine sees them.
#[async_trait]
pub trait WishlistApi: Send + Sync {
    /// The authoritative server-side wishlist.
    async fn fetch_all(&self) -> Result<Vec<WishlistEntry>, ApiError>;

    /// Add one product. Adding a product that is already present succeeds.
    async fn add_one(&self, id: ProductId) -> Result<(), ApiError>;

    /// Push several products in one request (login merge).
    async fn add_bulk(&self, ids: &[ProductId]) -> Result<(), ApiError>;

    /// Delete one product.
    async fn remove_one(&self, id: ProductId) -> Result<(), ApiError>;

    /// Delete several products in one request (login merge).
    async fn remove_bulk(&self, ids: &[ProductId]) -> Result<(), ApiError>;

    /// Delete every product.
    async fn clear_all(&self) -> Result<(), ApiError>;
}

/// [`WishlistApi`] over the real `/api/wishlist` endpoint.
#[derive(Debug, Clone)]
pub struct HttpWishlistApi {
    client: ApiClient,
}

impl HttpWishlistApi {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WishlistApi for HttpWishlistApi {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<WishlistEntry>, ApiError> {
        self.client.fetch(CollectionKind::Wishlist).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn add_one(&self, id: ProductId) -> Result<(), ApiError> {
        let result = self
            .client
            .call(
                Method::POST,
                CollectionKind::Wishlist,
                Some(json!({ "productId": id })),
            )
            .await;

        // 409 means the product is already wishlisted, which is exactly
        // the state the caller asked for.
        match result {
            Err(err) if err.is_conflict() => Ok(()),
            other => other,
        }
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn add_bulk(&self, ids: &[ProductId]) -> Result<(), ApiError> {
        self.client
            .call(
                Method::POST,
                CollectionKind::Wishlist,
                Some(json!(ids.iter().map(|id| json!({ "productId": id })).collect::<Vec<_>>())),
            )
            .await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn remove_one(&self, id: ProductId) -> Result<(), ApiError> {
        self.client
            .call(
                Method::DELETE,
                CollectionKind::Wishlist,
                Some(json!({ "productId": id })),
            )
            .await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn remove_bulk(&self, ids: &[ProductId]) -> Result<(), ApiError> {
        self.client
            .call(
                Method::DELETE,
                CollectionKind::Wishlist,
                Some(json!({ "productIds": ids })),
            )
            .await
    }

    #[instrument(skip(self))]
    async fn clear_all(&self) -> Result<(), ApiError> {
        self.client
            .call(Method::DELETE, CollectionKind::Wishlist, None)
            .await
    }
}
