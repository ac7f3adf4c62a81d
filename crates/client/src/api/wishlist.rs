//! Wishlist endpoints. The backend identifies the user from the token.

use shopsphere_core::ProductId;
use tracing::instrument;

use super::ApiError;
use super::types::{Product, WishlistCheck};
use crate::transport::{ApiRequest, Transport};

/// Client for `/wishlist`.
#[derive(Debug, Clone)]
pub struct WishlistApi {
    transport: Transport,
}

impl WishlistApi {
    #[must_use]
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Products on the current user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.transport.json(&ApiRequest::get("/wishlist")).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn add(&self, product: ProductId) -> Result<(), ApiError> {
        let request = ApiRequest::post(format!("/wishlist/add/{product}"))
            .json(&serde_json::json!({}))?;
        self.transport.execute(&request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn remove(&self, product: ProductId) -> Result<(), ApiError> {
        self.transport
            .execute(&ApiRequest::delete(format!("/wishlist/remove/{product}")))
            .await
    }

    /// Whether `product` is on the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a check
    /// result.
    #[instrument(skip(self))]
    pub async fn check(&self, product: ProductId) -> Result<bool, ApiError> {
        let request = ApiRequest::get(format!("/wishlist/check/{product}"));
        let check: WishlistCheck = self.transport.json(&request).await?;
        Ok(check.is_in_wishlist)
    }
}
