//! Session recovery from a persisted bearer token.
//!
//! [`SessionRecovery::restore_session`] asks the backend whether the stored
//! token is still good. It is used in two places: at startup, where the
//! caller retries it on a fixed schedule, and by the transport when a request
//! comes back 401.
//!
//! Ambiguous failures (network errors, 5xx answers, unexpected bodies) never
//! touch the stored credential. Only a 401 that explicitly says the token is
//! invalid or expired may clear it, and only under
//! [`InvalidTokenPolicy::Clear`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::api::{ApiError, ErrorBody, User, ValidateResponse};
use crate::storage::{CredentialStore, StorageError};
use crate::transport::endpoint;

const VALIDATE_PATH: &str = "/auth/validate";

/// What to do with the stored credential when the backend says the token is
/// invalid or expired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidTokenPolicy {
    /// Keep the token and user backup. The session can still be restored
    /// from the backup at startup.
    #[default]
    Retain,
    /// Clear token and user backup.
    Clear,
}

impl fmt::Display for InvalidTokenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retain => f.write_str("retain"),
            Self::Clear => f.write_str("clear"),
        }
    }
}

impl FromStr for InvalidTokenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retain" => Ok(Self::Retain),
            "clear" => Ok(Self::Clear),
            other => Err(format!("expected 'retain' or 'clear', got '{other}'")),
        }
    }
}

/// A session the backend confirmed.
#[derive(Debug, Clone)]
pub struct RestoredSession {
    pub user: User,
    pub token: SecretString,
}

/// Why a session could not be restored.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// Nothing to restore.
    #[error("no persisted token")]
    NoToken,

    /// The backend said the token is invalid or expired.
    #[error("token rejected as invalid: {0}")]
    InvalidToken(String),

    /// Some other 4xx answer from the validate endpoint.
    #[error("session validation rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend could not be reached or answered unexpectedly.
    #[error("session validation unavailable: {0}")]
    Unavailable(#[source] ApiError),

    /// The credential store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RestoreError {
    /// Whether a later attempt could succeed without user action.
    ///
    /// Only [`Unavailable`](Self::Unavailable) is retried; a definite
    /// answer from the backend will not change on its own.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Validates the persisted token against the backend.
///
/// The validate call uses its own request path, not the transport, so a 401
/// here can never recurse into another recovery.
#[derive(Clone)]
pub struct SessionRecovery {
    http: reqwest::Client,
    base: Url,
    store: Arc<dyn CredentialStore>,
    policy: InvalidTokenPolicy,
}

impl fmt::Debug for SessionRecovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecovery")
            .field("base", &self.base.as_str())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SessionRecovery {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base: Url,
        store: Arc<dyn CredentialStore>,
        policy: InvalidTokenPolicy,
    ) -> Self {
        Self {
            http,
            base,
            store,
            policy,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> InvalidTokenPolicy {
        self.policy
    }

    /// Validate the persisted token and return the session it belongs to.
    ///
    /// Storage is only written when the backend declares the token invalid
    /// and the policy is [`InvalidTokenPolicy::Clear`]. Persisting the
    /// returned user is up to the caller.
    ///
    /// # Errors
    ///
    /// See [`RestoreError`].
    #[instrument(skip(self), fields(policy = %self.policy))]
    pub async fn restore_session(&self) -> Result<RestoredSession, RestoreError> {
        let Some(token) = self.store.token()? else {
            debug!("No persisted token, nothing to restore");
            return Err(RestoreError::NoToken);
        };

        let url = endpoint(&self.base, VALIDATE_PATH).map_err(RestoreError::Unavailable)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Session validation request failed");
                RestoreError::Unavailable(e.into())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RestoreError::Unavailable(e.into()))?;

        if status.is_success() {
            let validated: ValidateResponse = serde_json::from_str(&body).map_err(|e| {
                warn!(error = %e, "Session validation returned an unexpected body");
                RestoreError::Unavailable(e.into())
            })?;
            info!(user_id = %validated.user.id, "Session validated");
            return Ok(RestoredSession {
                user: validated.user,
                token,
            });
        }

        let message = ErrorBody::message_from(&body)
            .unwrap_or_else(|| body.chars().take(200).collect());

        if status == StatusCode::UNAUTHORIZED && mentions_invalid_token(&message) {
            warn!(message = %message, "Backend declared the token invalid");
            if self.policy == InvalidTokenPolicy::Clear {
                self.store.clear_credential()?;
                info!("Cleared persisted credential");
            }
            return Err(RestoreError::InvalidToken(message));
        }

        if status.is_client_error() {
            warn!(status = %status, message = %message, "Session validation rejected");
            return Err(RestoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        warn!(status = %status, "Session validation unavailable");
        Err(RestoreError::Unavailable(ApiError::Status { status, message }))
    }
}

fn mentions_invalid_token(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("invalid") || message.contains("expired")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_policy_parse_and_display() {
        assert_eq!(
            "clear".parse::<InvalidTokenPolicy>().unwrap(),
            InvalidTokenPolicy::Clear
        );
        assert_eq!(
            " Retain ".parse::<InvalidTokenPolicy>().unwrap(),
            InvalidTokenPolicy::Retain
        );
        assert!("evict".parse::<InvalidTokenPolicy>().is_err());
        assert_eq!(InvalidTokenPolicy::default().to_string(), "retain");
    }

    #[test]
    fn test_mentions_invalid_token() {
        assert!(mentions_invalid_token("Invalid token"));
        assert!(mentions_invalid_token("JWT EXPIRED at 12:00"));
        assert!(!mentions_invalid_token("Full authentication is required"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(!RestoreError::NoToken.is_retryable());
        assert!(!RestoreError::InvalidToken("expired".into()).is_retryable());
        assert!(
            !RestoreError::Rejected {
                status: 403,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(RestoreError::Unavailable(ApiError::InvalidUrl("x".into())).is_retryable());
    }

    #[tokio::test]
    async fn test_no_token_never_touches_storage() {
        let store = Arc::new(MemoryStore::new());
        let recovery = SessionRecovery::new(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9/api").unwrap(),
            store.clone(),
            InvalidTokenPolicy::Clear,
        );

        for _ in 0..3 {
            assert!(matches!(
                recovery.restore_session().await,
                Err(RestoreError::NoToken)
            ));
        }
        assert_eq!(store.writes(), 0);
    }
}
