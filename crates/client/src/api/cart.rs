//! Cart endpoints. The backend keys carts by user id.

use shopsphere_core::{ProductId, UserId};
use tracing::{debug, instrument};

use super::ApiError;
use super::types::{CartItem, Product};
use crate::transport::{ApiRequest, Transport};

/// Client for `/cart/{userId}`.
#[derive(Debug, Clone)]
pub struct CartApi {
    transport: Transport,
}

impl CartApi {
    #[must_use]
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Current lines of `user`'s cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get(&self, user: UserId) -> Result<Vec<CartItem>, ApiError> {
        self.transport
            .json(&ApiRequest::get(format!("/cart/{user}")))
            .await
    }

    /// Add `quantity` units of `product`. Returns the resulting line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        user: UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<CartItem, ApiError> {
        let request = ApiRequest::post(format!("/cart/{user}/add"))
            .query("productId", product)
            .query("quantity", quantity);
        self.transport.json(&request).await
    }

    /// Set the quantity of `product`.
    ///
    /// Returns `None` when the backend removed the line instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        user: UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<Option<CartItem>, ApiError> {
        let request = ApiRequest::put(format!("/cart/{user}/update"))
            .query("productId", product)
            .query("quantity", quantity);
        let line = self.transport.json_opt(&request).await?;
        if line.is_none() {
            debug!("Backend removed the cart line");
        }
        Ok(line)
    }

    /// Remove `product` from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn remove(&self, user: UserId, product: ProductId) -> Result<(), ApiError> {
        self.transport
            .execute(&ApiRequest::delete(format!("/cart/{user}/remove/{product}")))
            .await
    }

    /// Products often bought with what is in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn recommendations(&self, user: UserId) -> Result<Vec<Product>, ApiError> {
        self.transport
            .json(&ApiRequest::get(format!("/cart/{user}/recommendations")))
            .await
    }
}
