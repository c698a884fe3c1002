//! Typed cart operations over the collection backend.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tidepool_core::{CartLine, CollectionKind, LineItem, ProductId};
use tracing::instrument;

use super::{ApiClient, ApiError};

/// Remote cart operations as the engine sees them.
///
/// Implementations must be safe to call concurrently; the engine holds its
/// own per-product locks above this seam.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// The authoritative server-side cart.
    async fn fetch_all(&self) -> Result<Vec<LineItem>, ApiError>;

    /// Add `quantity` units of one product.
    async fn add_one(&self, id: ProductId, quantity: u32) -> Result<(), ApiError>;

    /// Push several lines in one request (login merge).
    async fn add_bulk(&self, lines: &[CartLine]) -> Result<(), ApiError>;

    /// Set the quantity of an existing line.
    async fn update_quantity(&self, id: ProductId, quantity: u32) -> Result<(), ApiError>;

    /// Delete one line.
    async fn remove_one(&self, id: ProductId) -> Result<(), ApiError>;

    /// Delete several lines in one request (login merge).
    async fn remove_bulk(&self, ids: &[ProductId]) -> Result<(), ApiError>;

    /// Delete every line.
    async fn clear_all(&self) -> Result<(), ApiError>;
}

/// [`CartApi`] over the real `/api/cart` endpoint.
#[derive(Debug, Clone)]
pub struct HttpCartApi {
    client: ApiClient,
}

impl HttpCartApi {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CartApi for HttpCartApi {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<LineItem>, ApiError> {
        self.client.fetch(CollectionKind::Cart).await
    }

    #[instrument(skip(self), fields(id = %id, quantity))]
    async fn add_one(&self, id: ProductId, quantity: u32) -> Result<(), ApiError> {
        self.client
            .call(
                Method::POST,
                CollectionKind::Cart,
                Some(json!({ "productId": id, "quantity": quantity })),
            )
            .await
    }

    #[instrument(skip(self, lines), fields(count = lines.len()))]
    async fn add_bulk(&self, lines: &[CartLine]) -> Result<(), ApiError> {
        self.client
            .call(Method::POST, CollectionKind::Cart, Some(json!(lines)))
            .await
    }

    #[instrument(skip(self), fields(id = %id, quantity))]
    async fn update_quantity(&self, id: ProductId, quantity: u32) -> Result<(), ApiError> {
        self.client
            .call(
                Method::PUT,
                CollectionKind::Cart,
                Some(json!({ "productId": id, "quantity": quantity })),
            )
            .await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn remove_one(&self, id: ProductId) -> Result<(), ApiError> {
        self.client
            .call(
                Method::DELETE,
                CollectionKind::Cart,
                Some(json!({ "productId": id })),
            )
            .await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn remove_bulk(&self, ids: &[ProductId]) -> Result<(), ApiError> {
        self.client
            .call(
                Method::DELETE,
                CollectionKind::Cart,
                Some(json!({ "productIds": ids })),
            )
            .await
    }

    #[instrument(skip(self))]
    async fn clear_all(&self) -> Result<(), ApiError> {
        self.client
            .call(Method::DELETE, CollectionKind::Cart, None)
            .await
    }
}
