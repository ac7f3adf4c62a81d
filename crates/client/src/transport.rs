//! HTTP transport with bearer credentials and one-shot 401 recovery.
//!
//! Every request is described by a replayable [`ApiRequest`]. The transport
//! attaches the persisted token, sends the request, and when the backend
//! answers 401 it asks [`SessionRecovery`] to validate the stored token. If
//! that succeeds the original request is replayed exactly once; otherwise
//! the original failure is returned. A replay that fails again, 401 included,
//! is returned as is.

use std::fmt;
use std::sync::Arc;

use reqwest::header::RETRY_AFTER;
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::api::{ApiError, ErrorBody};
use crate::config::ClientConfig;
use crate::session::{RestoredSession, SessionRecovery};
use crate::storage::CredentialStore;

/// Longest slice of a response body copied into errors and logs.
const BODY_PREVIEW_CHARS: usize = 200;

/// Callback run after the transport restored a session on its own.
pub type SessionHook = Arc<dyn Fn(&RestoredSession) + Send + Sync>;

// =============================================================================
// ApiRequest
// =============================================================================

/// A request that can be sent more than once.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Request `path` (relative to the API base URL) with `method`.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Resolve an endpoint path against the API base URL.
///
/// Path segments are percent-encoded individually, so `category/Home & Kitchen`
/// stays one segment.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidUrl(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(path.trim_matches('/').split('/').filter(|s| !s.is_empty()));
    Ok(url)
}

// =============================================================================
// Transport
// =============================================================================

/// Authenticated HTTP transport shared by every resource client.
///
/// Cheap to clone; clones share the connection pool and credential store.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    http: reqwest::Client,
    base: Url,
    store: Arc<dyn CredentialStore>,
    recovery: SessionRecovery,
    on_restored: Option<SessionHook>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Create a transport for `config` using `store` for credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        Self::with_session_hook(config, store, None)
    }

    /// Like [`new`](Self::new), calling `on_restored` whenever a 401 led to
    /// a successful session recovery.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_session_hook(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        on_restored: Option<SessionHook>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("shopsphere-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let recovery = SessionRecovery::new(
            http.clone(),
            config.api_url.clone(),
            Arc::clone(&store),
            config.invalid_token_policy,
        );

        Ok(Self {
            inner: Arc::new(TransportInner {
                http,
                base: config.api_url.clone(),
                store,
                recovery,
                on_restored,
            }),
        })
    }

    /// The session recovery manager this transport uses on 401.
    #[must_use]
    pub fn recovery(&self) -> &SessionRecovery {
        &self.inner.recovery
    }

    /// The credential store requests read their token from.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// Send `request`, recovering the session once on 401.
    ///
    /// Returns the successful response; every non-success status becomes an
    /// [`ApiError`].
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures and non-success statuses.
    #[instrument(skip(self), fields(request = %request))]
    pub async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response, ApiError> {
        let mut retried = false;

        loop {
            let response = self.dispatch(request).await?;
            let status = response.status();

            if status != StatusCode::UNAUTHORIZED || retried {
                return check_status(response).await;
            }
            retried = true;

            let original = check_status(response).await.err().unwrap_or_else(|| {
                ApiError::Unauthorized(String::from("authorization required"))
            });

            if self.inner.store.token()?.is_none() {
                debug!("401 without a persisted token, not recovering");
                return Err(original);
            }

            match self.inner.recovery.restore_session().await {
                Ok(restored) => {
                    self.inner.store.set_user(&restored.user)?;
                    if let Some(hook) = &self.inner.on_restored {
                        hook(&restored);
                    }
                    info!(user_id = %restored.user.id, "Session restored, replaying request");
                }
                Err(e) => {
                    warn!(error = %e, "Session recovery failed, not replaying request");
                    return Err(original);
                }
            }
        }
    }

    /// Send `request` and decode a JSON response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        decode(request, &body)
    }

    /// Send `request` and decode the body, treating an empty or `null` body
    /// as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a non-empty body does not decode.
    pub async fn json_opt<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<Option<T>, ApiError> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        decode(request, trimmed).map(Some)
    }

    /// Send `request` and discard the response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn execute(&self, request: &ApiRequest) -> Result<(), ApiError> {
        self.send(request).await.map(drop)
    }

    /// Build and send one attempt of `request` with the current token.
    async fn dispatch(&self, request: &ApiRequest) -> Result<reqwest::Response, ApiError> {
        let url = endpoint(&self.inner.base, &request.path)?;
        let mut builder = self.inner.http.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.inner.store.token()? {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        debug!(status = %response.status(), "Backend responded");
        Ok(response)
    }
}

/// Turn a non-success response into the matching [`ApiError`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Check for rate limiting
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(ApiError::RateLimited(retry_after));
    }

    let body = response.text().await.unwrap_or_default();
    let message = ErrorBody::message_from(&body)
        .unwrap_or_else(|| body.chars().take(BODY_PREVIEW_CHARS).collect());

    Err(match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => {
            if status.is_server_error() {
                error!(status = %status, message = %message, "Backend returned server error");
            }
            ApiError::Status { status, message }
        }
    })
}

fn decode<T: DeserializeOwned>(request: &ApiRequest, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        error!(
            request = %request,
            error = %e,
            body = %body.chars().take(BODY_PREVIEW_CHARS).collect::<String>(),
            "Failed to parse backend response"
        );
        ApiError::Parse(e)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("http://localhost:8080/api").unwrap();
        assert_eq!(
            endpoint(&base, "/auth/validate").unwrap().as_str(),
            "http://localhost:8080/api/auth/validate"
        );

        let base = Url::parse("http://localhost:8080/api/").unwrap();
        assert_eq!(
            endpoint(&base, "cart/7/remove/3").unwrap().as_str(),
            "http://localhost:8080/api/cart/7/remove/3"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = Url::parse("http://localhost:8080/api").unwrap();
        assert_eq!(
            endpoint(&base, "/products/category/Home & Kitchen").unwrap().as_str(),
            "http://localhost:8080/api/products/category/Home%20&%20Kitchen"
        );
    }

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::post("/cart/1/add")
            .query("productId", 5)
            .query("quantity", 2);
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.to_string(), "POST /cart/1/add");
        assert_eq!(
            request.query,
            [
                ("productId".to_string(), "5".to_string()),
                ("quantity".to_string(), "2".to_string())
            ]
        );

        let request = ApiRequest::post("/orders")
            .json(&serde_json::json!({"userId": 1}))
            .unwrap();
        assert_eq!(request.body.unwrap()["userId"], 1);
    }
}
