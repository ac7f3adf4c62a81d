//! Error type for the `ShopSphere` facade.
//!
//! Operations on [`ShopSphere`](crate::ShopSphere) return [`ClientError`]. The
//! lower layers keep their own error types and convert via `#[from]`.

use shopsphere_core::EmailError;
use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::PaymentError;
use crate::config::ConfigError;
use crate::session::RestoreError;
use crate::storage::StorageError;

/// Facade-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The operation needs an authenticated session.
    #[error("Please login to continue")]
    LoginRequired,

    /// Checkout was attempted with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Input rejected before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Payment details are malformed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session could not be restored.
    #[error("Session error: {0}")]
    Restore(#[from] RestoreError),

    /// Persisted state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Email address is malformed.
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Message suitable for a transient notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    /// Whether the error means a product or order does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(ApiError::NotFound(_)))
    }
}

/// Result type alias for facade operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        assert_eq!(
            ClientError::LoginRequired.to_string(),
            "Please login to continue"
        );
        assert_eq!(ClientError::EmptyCart.to_string(), "Your cart is empty");
        assert_eq!(
            ClientError::Payment(PaymentError::Cvv).to_string(),
            "Payment error: Please enter a valid 3-digit CVV"
        );
    }

    #[test]
    fn test_user_message_unwraps_api_errors() {
        let err = ClientError::Api(ApiError::NotFound("Product not found: 3".to_string()));
        assert_eq!(err.user_message(), "Product not found: 3");
        assert!(err.is_not_found());
        assert!(!ClientError::EmptyCart.is_not_found());
    }
}
