//! 401 recovery: one session restore, at most one replay.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use shopsphere_client::api::ApiError;
use shopsphere_client::{ClientError, CredentialStore, PersistedState};
use shopsphere_core::UserId;
use shopsphere_integration_tests::{
    TOKEN, TestContext, api_path, cart_item_json, product_json, user_json,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

const VALIDATE: &str = "/auth/validate";
const CART: &str = "/cart/5";

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({"error": "Unauthorized"}))
}

#[tokio::test]
async fn test_replay_after_successful_recovery() {
    let ctx = TestContext::restored(5).await;
    Mock::given(method("GET"))
        .and(path(api_path(CART)))
        .respond_with(unauthorized())
        .up_to_n_times(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path(CART)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cart_item_json(1, 10, 250, 2)])))
        .mount(&ctx.server)
        .await;

    let items = ctx.client.load_cart().await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(ctx.hits(CART).await, 2);
    // One validate at startup, one for the recovery.
    assert_eq!(ctx.hits(VALIDATE).await, 2);
}

#[tokio::test]
async fn test_replay_happens_at_most_once() {
    let ctx = TestContext::restored(5).await;
    Mock::given(method("GET"))
        .and(path(api_path(CART)))
        .respond_with(unauthorized())
        .mount(&ctx.server)
        .await;

    let err = ctx.client.load_cart().await.unwrap_err();

    assert!(matches!(err, ClientError::Api(ApiError::Unauthorized(_))));
    assert_eq!(ctx.hits(CART).await, 2);
    assert_eq!(ctx.hits(VALIDATE).await, 2);
}

#[tokio::test]
async fn test_failed_recovery_returns_original_error() {
    let ctx = TestContext::restored(5).await;
    ctx.server.reset().await;
    Mock::given(method("GET"))
        .and(path(api_path(VALIDATE)))
        .respond_with(ResponseTemplate::new(503))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path(CART)))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Session ended"})))
        .mount(&ctx.server)
        .await;

    let err = ctx.client.load_cart().await.unwrap_err();

    assert!(matches!(err, ClientError::Api(ApiError::Unauthorized(ref m)) if m == "Session ended"));
    assert_eq!(ctx.hits(CART).await, 1);
    assert_eq!(ctx.hits(VALIDATE).await, 1);
    assert!(ctx.store.token().unwrap().is_some());
}

#[tokio::test]
async fn test_no_recovery_without_token() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(api_path("/products")))
        .respond_with(unauthorized())
        .mount(&ctx.server)
        .await;

    let err = ctx.client.load_products(None).await.unwrap_err();

    assert!(matches!(err, ClientError::Api(ApiError::Unauthorized(_))));
    assert_eq!(ctx.hits("/products").await, 1);
    assert_eq!(ctx.hits(VALIDATE).await, 0);
}

#[tokio::test]
async fn test_recovery_authenticates_lone_token() {
    let ctx = TestContext::with_state(PersistedState {
        token: Some(SecretString::from(TOKEN)),
        ..PersistedState::default()
    })
    .await;
    Mock::given(method("GET"))
        .and(path(api_path(VALIDATE)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json(7)})))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("/products")))
        .respond_with(unauthorized())
        .up_to_n_times(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("/products")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, "Kurta", 799)])))
        .mount(&ctx.server)
        .await;

    assert!(!ctx.client.is_authenticated());
    let products = ctx.client.load_products(None).await.unwrap();

    assert_eq!(products.len(), 1);
    assert!(ctx.client.is_authenticated());
    assert_eq!(ctx.client.current_user().unwrap().id, UserId::new(7));
    assert_eq!(ctx.store.user().unwrap().unwrap().id, UserId::new(7));
}

#[tokio::test]
async fn test_rate_limit_surfaces_retry_after() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(api_path("/products/top-rated")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&ctx.server)
        .await;

    let err = ctx.client.products().top_rated().await.unwrap_err();

    assert!(matches!(err, ApiError::RateLimited(7)));
}

#[tokio::test]
async fn test_error_body_message_is_kept() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Invalid email or password"})),
        )
        .mount(&ctx.server)
        .await;

    let err = ctx
        .client
        .login("asha@shopsphere.in", &SecretString::from("wrong"))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Invalid email or password");
    assert!(ctx.client.state().notice.unwrap().is_error());
    assert_eq!(ctx.store.writes(), 0);
}
