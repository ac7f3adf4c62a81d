//! Product review endpoints.

use shopsphere_core::{ProductId, ReviewId, UserId};
use tracing::{info, instrument};

use super::ApiError;
use super::types::{Review, ReviewEligibility, ReviewInput};
use crate::transport::{ApiRequest, Transport};

/// Lowest accepted star rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted star rating.
pub const MAX_RATING: u8 = 5;

/// Client for `/reviews`.
#[derive(Debug, Clone)]
pub struct ReviewsApi {
    transport: Transport,
}

impl ReviewsApi {
    #[must_use]
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn for_product(&self, product: ProductId) -> Result<Vec<Review>, ApiError> {
        self.transport
            .json(&ApiRequest::get(format!("/reviews/product/{product}")))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn for_user(&self, user: UserId) -> Result<Vec<Review>, ApiError> {
        self.transport
            .json(&ApiRequest::get(format!("/reviews/user/{user}")))
            .await
    }

    /// Review `product`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a rating outside 1..=5,
    /// otherwise an error if the backend refuses the review.
    #[instrument(skip(self, comment))]
    pub async fn create(
        &self,
        product: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Review, ApiError> {
        check_rating(rating)?;
        let body = ReviewInput {
            product_id: Some(product),
            rating,
            comment: comment.trim().to_string(),
        };
        let review: Review = self
            .transport
            .json(&ApiRequest::post("/reviews").json(&body)?)
            .await?;
        info!(review_id = %review.id, "Review created");
        Ok(review)
    }

    /// Change an existing review.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a rating outside 1..=5,
    /// otherwise an error if the backend refuses the change.
    #[instrument(skip(self, comment))]
    pub async fn update(
        &self,
        review: ReviewId,
        rating: u8,
        comment: &str,
    ) -> Result<Review, ApiError> {
        check_rating(rating)?;
        let body = ReviewInput {
            product_id: None,
            rating,
            comment: comment.trim().to_string(),
        };
        self.transport
            .json(&ApiRequest::put(format!("/reviews/{review}")).json(&body)?)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, review: ReviewId) -> Result<(), ApiError> {
        self.transport
            .execute(&ApiRequest::delete(format!("/reviews/{review}")))
            .await
    }

    /// Whether the current user may review `product`, and why not.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn can_review(&self, product: ProductId) -> Result<ReviewEligibility, ApiError> {
        self.transport
            .json(&ApiRequest::get(format!("/reviews/can-review/{product}")))
            .await
    }
}

fn check_rating(rating: u8) -> Result<(), ApiError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ApiError::InvalidRequest(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rating_bounds() {
        assert!(check_rating(1).is_ok());
        assert!(check_rating(5).is_ok());
        assert!(matches!(check_rating(0), Err(ApiError::InvalidRequest(_))));
        assert!(matches!(check_rating(6), Err(ApiError::InvalidRequest(_))));
    }
}
