//! Authentication endpoints.

use secrecy::{ExposeSecret, SecretString};
use shopsphere_core::{Email, UserId};
use tracing::{info, instrument};

use super::ApiError;
use super::types::{AuthResponse, LoginRequest, RegisterRequest, UserProfile, ValidateResponse};
use crate::transport::{ApiRequest, Transport};

/// Client for `/auth`.
#[derive(Debug, Clone)]
pub struct AuthApi {
    transport: Transport,
}

impl AuthApi {
    #[must_use]
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for a wrong email or password.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let request = ApiRequest::post("/auth/login").json(&body)?;
        let response: AuthResponse = self.transport.json(&request).await?;
        info!(user_id = %response.user.id, "Logged in");
        Ok(response)
    }

    /// Create an account and log into it.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken or the request fails.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let request = ApiRequest::post("/auth/register").json(registration)?;
        let response: AuthResponse = self.transport.json(&request).await?;
        info!(user_id = %response.user.id, "Registered");
        Ok(response)
    }

    /// The user the current token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self))]
    pub async fn validate(&self) -> Result<ValidateResponse, ApiError> {
        self.transport
            .json(&ApiRequest::get("/auth/validate"))
            .await
    }

    /// Full profile of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown user.
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: UserId) -> Result<UserProfile, ApiError> {
        self.transport
            .json(&ApiRequest::get(format!("/auth/profile/{user_id}")))
            .await
    }
}
