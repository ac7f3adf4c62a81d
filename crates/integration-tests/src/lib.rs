//! Integration tests for the ShopSphere client.
//!
//! Every test runs the real client against a `wiremock` server standing in
//! for the backend, so no running services are needed:
//!
//! ```bash
//! cargo test -p shopsphere-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_recovery` - Startup restore and token eviction policy
//! - `transport_retry` - 401 recovery and replay
//! - `list_sync` - Eventually-consistent orders, cart and wishlist
//! - `storefront_flows` - Guarded mutations, cart and checkout

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::{Value, json};
use shopsphere_client::api::User;
use shopsphere_client::{
    ClientConfig, InvalidTokenPolicy, MemoryStore, PersistedState, ShopSphere, SyncPolicy,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path prefix the backend serves its API under.
pub const API_PREFIX: &str = "/api";

/// Token used by tests that start with a persisted credential.
pub const TOKEN: &str = "jwt-token";

/// A mock backend plus a client wired to it.
pub struct TestContext {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
    pub client: ShopSphere,
}

impl TestContext {
    /// Fresh client with empty storage.
    pub async fn new() -> Self {
        Self::with_state(PersistedState::default()).await
    }

    /// Client whose storage already holds a token and user backup.
    pub async fn signed_in(user: User) -> Self {
        Self::with_state(PersistedState {
            token: Some(SecretString::from(TOKEN)),
            user: Some(user),
            ..PersistedState::default()
        })
        .await
    }

    /// Signed-in client whose session the backend confirmed at startup.
    pub async fn restored(user_id: i64) -> Self {
        let ctx = Self::signed_in(user(user_id)).await;
        Mock::given(method("GET"))
            .and(path(api_path("/auth/validate")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json(user_id)})))
            .mount(&ctx.server)
            .await;
        assert!(ctx.client.bootstrap().await.unwrap());
        ctx
    }

    pub async fn with_state(state: PersistedState) -> Self {
        Self::with_config(state, |_| {}).await
    }

    /// Same as [`with_state`](Self::with_state) with a config tweak.
    pub async fn with_config(
        state: PersistedState,
        tweak: impl FnOnce(&mut ClientConfig),
    ) -> Self {
        let server = MockServer::start().await;
        let mut config = config_for(&server.uri());
        tweak(&mut config);
        let store = Arc::new(MemoryStore::with_state(state));
        let client = ShopSphere::new(config, store.clone()).unwrap();
        Self {
            server,
            store,
            client,
        }
    }

    /// Number of requests the backend saw on `path` (without the API prefix).
    pub async fn hits(&self, route: &str) -> usize {
        let full = api_path(route);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == full)
            .count()
    }

    /// Total number of requests the backend saw.
    pub async fn total_hits(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .len()
    }
}

/// Full request path for a backend route.
#[must_use]
pub fn api_path(route: &str) -> String {
    format!("{API_PREFIX}{route}")
}

/// Client config with every delay shortened for tests.
#[must_use]
pub fn config_for(server_uri: &str) -> ClientConfig {
    let mut config = ClientConfig::for_api_url(&format!("{server_uri}{API_PREFIX}")).unwrap();
    config.request_timeout = Duration::from_secs(5);
    config.invalid_token_policy = InvalidTokenPolicy::Retain;
    config.restore_retry_delays = vec![Duration::from_millis(10), Duration::from_millis(20)];
    config.payment_delay = Duration::ZERO;
    config.sync = SyncPolicy {
        settle_delay: Duration::from_millis(5),
        initial_delay: Duration::from_millis(5),
        backoff_factor: 1.5,
        max_retries: 5,
    };
    config
}

/// Backend JSON for a user.
#[must_use]
pub fn user_json(id: i64) -> Value {
    json!({
        "id": id,
        "email": format!("user{id}@shopsphere.in"),
        "firstName": "Asha",
        "lastName": "Rao",
        "role": "USER"
    })
}

#[must_use]
pub fn user(id: i64) -> User {
    serde_json::from_value(user_json(id)).unwrap()
}

/// Backend JSON for a product.
#[must_use]
pub fn product_json(id: i64, name: &str, price: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": price,
        "category": "Clothing",
        "stock": 10
    })
}

/// Backend JSON for a cart line.
#[must_use]
pub fn cart_item_json(id: i64, product: i64, price: u32, quantity: u32) -> Value {
    json!({
        "id": id,
        "product": {"id": product, "name": format!("Product {product}"), "price": price},
        "quantity": quantity
    })
}

/// Backend JSON for an order.
#[must_use]
pub fn order_json(id: i64, total: u32) -> Value {
    json!({
        "id": id,
        "orderItems": [],
        "totalAmount": total,
        "status": "PENDING",
        "createdAt": "2024-05-01T10:00:00"
    })
}
