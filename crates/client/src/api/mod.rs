//! Typed clients for the ShopSphere REST backend.
//!
//! # Architecture
//!
//! - Every call goes through [`Transport`](crate::transport::Transport), which
//!   attaches the bearer token and performs one session recovery on a 401
//! - The backend is the source of truth; these wrappers keep no state except
//!   the product read cache
//! - Product reads are cached in memory via `moka` (5 minute TTL) and admin
//!   writes invalidate the cache
//!
//! # Example
//!
//! ```rust,ignore
//! use shopsphere_client::api::ProductsApi;
//!
//! let products = ProductsApi::new(transport.clone());
//! let laptops = products.search("laptop").await?;
//! let detail = products.get(laptops[0].id).await?;
//! ```

mod auth;
mod cache;
mod cart;
mod orders;
mod products;
mod reviews;
pub mod types;
mod wishlist;

pub use auth::AuthApi;
pub use cart::CartApi;
pub use orders::OrdersApi;
pub use products::ProductsApi;
pub use reviews::{MAX_RATING, MIN_RATING, ReviewsApi};
pub use types::*;
pub use wishlist::WishlistApi;

use reqwest::StatusCode;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur when talking to the ShopSphere backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request's credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Error message extracted from the response body.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The request was rejected before it was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A request URL could not be built from the configured base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The credential store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::RateLimited(_) => Some(StatusCode::TOO_MANY_REQUESTS),
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            Self::Parse(_) | Self::InvalidRequest(_) | Self::InvalidUrl(_) | Self::Storage(_) => {
                None
            }
        }
    }

    /// Whether the error is an authorization failure.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Whether retrying the same request later might succeed.
    ///
    /// Network failures, 5xx answers and rate limiting are transient;
    /// client errors and decoding failures are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited(_) => true,
            Self::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    /// Message suitable for a transient notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::InvalidRequest(msg)
            | Self::Status { message: msg, .. }
                if !msg.is_empty() =>
            {
                msg.clone()
            }
            Self::Http(_) => "Could not reach the ShopSphere server".to_string(),
            Self::RateLimited(secs) => format!("Too many requests, try again in {secs}s"),
            _ => "Something went wrong, please try again".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("Product not found: 9".to_string());
        assert_eq!(err.to_string(), "Not found: Product not found: 9");

        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: "Email already exists".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 400 Bad Request: Email already exists");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
        assert!(err.is_transient());
    }

    #[test]
    fn test_transient_classification() {
        let server = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            message: String::new(),
        };
        let client = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: String::new(),
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
        assert!(!ApiError::Unauthorized("x".into()).is_transient());
    }

    #[test]
    fn test_user_message_prefers_backend_text() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: "Product out of stock".to_string(),
        };
        assert_eq!(err.user_message(), "Product out of stock");

        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: String::new(),
        };
        assert_eq!(err.user_message(), "Something went wrong, please try again");
    }
}
