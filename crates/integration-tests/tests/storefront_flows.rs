//! Facade flows against a mocked backend.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use shopsphere_client::checkout::{CardDetails, PaymentDetails, PaymentMethod, ShippingDetails};
use shopsphere_client::{ClientError, CredentialStore, Route};
use shopsphere_core::ProductId;
use shopsphere_integration_tests::{
    TestContext, api_path, cart_item_json, order_json, product_json, user_json,
};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn shipping() -> ShippingDetails {
    ShippingDetails {
        address: "12 MG Road".to_string(),
        city: "Pune".to_string(),
        zip_code: "411001".to_string(),
        country: "India".to_string(),
        phone: "9876543210".to_string(),
    }
}

// ============================================================================
// Guarded operations
// ============================================================================

#[tokio::test]
async fn test_add_to_cart_without_session_sends_nothing() {
    let ctx = TestContext::new().await;

    let err = ctx
        .client
        .add_to_cart(ProductId::new(1), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::LoginRequired));
    assert_eq!(ctx.total_hits().await, 0);

    let state = ctx.client.state();
    assert_eq!(state.redirect, Some(Route::Login));
    assert_eq!(state.notice.unwrap().message(), "Please login to continue");
}

#[tokio::test]
async fn test_checkout_without_session_sends_nothing() {
    let ctx = TestContext::new().await;
    let payment = PaymentDetails {
        method: PaymentMethod::Cod,
        card: None,
    };

    let err = ctx.client.checkout(&shipping(), &payment).await.unwrap_err();

    assert!(matches!(err, ClientError::LoginRequired));
    assert_eq!(ctx.total_hits().await, 0);
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_login_persists_credential() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .and(body_partial_json(json!({"email": "user3@shopsphere.in"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": "fresh", "user": user_json(3)})),
        )
        .mount(&ctx.server)
        .await;

    let user = ctx
        .client
        .login("user3@shopsphere.in", &SecretString::from("secret"))
        .await
        .unwrap();

    assert_eq!(user.display_name(), "Asha Rao");
    assert!(ctx.client.is_authenticated());
    assert!(ctx.store.token().unwrap().is_some());
    assert_eq!(ctx.store.user().unwrap().unwrap(), user);
}

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let ctx = TestContext::new().await;

    let err = ctx
        .client
        .login("not-an-email", &SecretString::from("secret"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Email(_)));
    assert_eq!(ctx.total_hits().await, 0);
}

#[tokio::test]
async fn test_logout_clears_per_user_state() {
    let ctx = TestContext::restored(5).await;
    Mock::given(method("GET"))
        .and(path(api_path("/cart/5")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cart_item_json(1, 2, 100, 1)])))
        .mount(&ctx.server)
        .await;
    ctx.client.load_cart().await.unwrap();

    ctx.client.logout().unwrap();

    let state = ctx.client.state();
    assert!(!state.auth.is_authenticated());
    assert!(state.cart.items.is_empty());
    assert!(ctx.store.token().unwrap().is_none());
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_product_reads_are_cached() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(api_path("/products/4")))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(4, "Mug", 149)))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let first = ctx.client.product(ProductId::new(4)).await.unwrap();
    let second = ctx.client.product(ProductId::new(4)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(ctx.hits("/products/4").await, 1);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(api_path("/products/99")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&ctx.server)
        .await;

    let err = ctx.client.product(ProductId::new(99)).await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_search_records_recent_query() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(api_path("/products/search")))
        .and(query_param("q", "silk saree"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, "Silk Saree", 2999)])))
        .mount(&ctx.server)
        .await;

    let results = ctx.client.search_products("  silk saree ").await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(
        ctx.store.load().unwrap().recent_searches.as_slice(),
        ["silk saree"]
    );
    assert_eq!(
        ctx.client.state().products.recent_searches.as_slice(),
        ["silk saree"]
    );
}

#[tokio::test]
async fn test_category_path_is_encoded() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(api_path("/products/category/Home%20&%20Kitchen")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(6, "Kettle", 1499)])))
        .mount(&ctx.server)
        .await;

    let products = ctx.client.load_products(Some("Home & Kitchen")).await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(ctx.client.state().products.items.len(), 1);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_add_to_cart_sends_query_parameters() {
    let ctx = TestContext::restored(5).await;
    Mock::given(method("POST"))
        .and(path(api_path("/cart/5/add")))
        .and(query_param("productId", "10"))
        .and(query_param("quantity", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_item_json(1, 10, 250, 3)))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let line = ctx.client.add_to_cart(ProductId::new(10), 3).await.unwrap();

    assert_eq!(line.quantity, 3);
    let state = ctx.client.state();
    assert_eq!(state.cart.item_count(), 3);
    assert_eq!(state.notice.unwrap().message(), "Product 10 added to cart");
}

#[tokio::test]
async fn test_zero_quantity_removes_line() {
    let ctx = TestContext::restored(5).await;
    Mock::given(method("DELETE"))
        .and(path(api_path("/cart/5/remove/10")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let line = ctx
        .client
        .update_cart_quantity(ProductId::new(10), 0)
        .await
        .unwrap();

    assert!(line.is_none());
    assert_eq!(ctx.hits("/cart/5/update").await, 0);
}

#[tokio::test]
async fn test_cart_recommendations_use_signed_in_user() {
    let ctx = TestContext::restored(5).await;
    Mock::given(method("GET"))
        .and(path(api_path("/cart/5/recommendations")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(6, "Kettle", 1499)])))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let products = ctx.client.cart_recommendations().await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products.first().unwrap().name, "Kettle");
}

// ============================================================================
// Failed mutations
// ============================================================================

async fn loaded_cart(ctx: &TestContext) {
    Mock::given(method("GET"))
        .and(path(api_path("/cart/5")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            cart_item_json(1, 10, 250, 2),
            cart_item_json(2, 11, 100, 1)
        ])))
        .mount(&ctx.server)
        .await;
    ctx.client.load_cart().await.unwrap();
}

#[tokio::test]
async fn test_failed_add_to_cart_leaves_cart_alone() {
    let ctx = TestContext::restored(5).await;
    loaded_cart(&ctx).await;
    Mock::given(method("POST"))
        .and(path(api_path("/cart/5/add")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;

    let err = ctx.client.add_to_cart(ProductId::new(12), 1).await;

    assert!(err.is_err());
    let state = ctx.client.state();
    assert!(state.notice.unwrap().is_error());
    assert_eq!(state.cart.items.len(), 2);
    assert_eq!(state.cart.item_count(), 3);
    assert!(state.redirect.is_none());
}

#[tokio::test]
async fn test_failed_remove_from_cart_keeps_line() {
    let ctx = TestContext::restored(5).await;
    loaded_cart(&ctx).await;
    Mock::given(method("DELETE"))
        .and(path(api_path("/cart/5/remove/10")))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Item could not be removed"})),
        )
        .mount(&ctx.server)
        .await;

    let err = ctx.client.remove_from_cart(ProductId::new(10)).await.unwrap_err();

    assert_eq!(err.user_message(), "Item could not be removed");
    let state = ctx.client.state();
    let notice = state.notice.unwrap();
    assert!(notice.is_error());
    assert_eq!(notice.message(), "Item could not be removed");
    assert_eq!(state.cart.items.len(), 2);
    assert!(state.cart.items.iter().any(|line| line.product.id == ProductId::new(10)));
}

#[tokio::test]
async fn test_failed_add_to_wishlist_leaves_wishlist_alone() {
    let ctx = TestContext::restored(5).await;
    Mock::given(method("GET"))
        .and(path(api_path("/wishlist")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(4, "Mug", 149)])))
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("/wishlist/add/7")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;
    ctx.client.load_wishlist().await.unwrap();

    let err = ctx.client.add_to_wishlist(ProductId::new(7)).await;

    assert!(err.is_err());
    let state = ctx.client.state();
    assert!(state.notice.unwrap().is_error());
    assert_eq!(state.wishlist.items.len(), 1);
    assert!(state.wishlist.contains(ProductId::new(4)));
    assert!(!state.wishlist.contains(ProductId::new(7)));
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_places_order_and_clears_cart() {
    let ctx = TestContext::restored(5).await;
    Mock::given(method("GET"))
        .and(path(api_path("/cart/5")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            cart_item_json(1, 10, 250, 2),
            cart_item_json(2, 11, 100, 1)
        ])))
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("/orders")))
        .and(body_partial_json(json!({
            "userId": 5,
            "paymentMethod": "upi",
            "paymentVerified": true,
            "shippingAddress": "12 MG Road, Pune, 411001, India"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json(77, 600)))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let payment = PaymentDetails {
        method: PaymentMethod::Upi,
        card: None,
    };
    let order = ctx.client.checkout(&shipping(), &payment).await.unwrap();

    assert_eq!(order.id.as_i64(), 77);
    let state = ctx.client.state();
    assert!(state.cart.items.is_empty());
    assert_eq!(state.notice.unwrap().message(), "Order #77 placed");
}

#[tokio::test]
async fn test_checkout_with_empty_cart_places_nothing() {
    let ctx = TestContext::restored(5).await;
    Mock::given(method("GET"))
        .and(path(api_path("/cart/5")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&ctx.server)
        .await;

    let payment = PaymentDetails {
        method: PaymentMethod::Cod,
        card: None,
    };
    let err = ctx.client.checkout(&shipping(), &payment).await.unwrap_err();

    assert!(matches!(err, ClientError::EmptyCart));
    assert_eq!(ctx.hits("/orders").await, 0);
}

#[tokio::test]
async fn test_checkout_rejects_bad_card_before_any_request() {
    let ctx = TestContext::restored(5).await;
    let before = ctx.total_hits().await;
    let payment = PaymentDetails {
        method: PaymentMethod::Card,
        card: Some(CardDetails {
            number: "4111".to_string(),
            expiry: "08/29".to_string(),
            cvv: "123".to_string(),
            holder_name: "Asha Rao".to_string(),
        }),
    };

    let err = ctx.client.checkout(&shipping(), &payment).await.unwrap_err();

    assert!(matches!(err, ClientError::Payment(_)));
    assert_eq!(ctx.total_hits().await, before);
}

// ============================================================================
// Reviews
// ============================================================================

#[tokio::test]
async fn test_review_refreshes_cached_product() {
    let ctx = TestContext::restored(5).await;
    Mock::given(method("GET"))
        .and(path(api_path("/products/4")))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(4, "Mug", 149)))
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("/reviews")))
        .and(body_partial_json(json!({"productId": 4, "rating": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "rating": 5,
            "comment": "Lovely",
            "verifiedPurchase": true
        })))
        .mount(&ctx.server)
        .await;

    ctx.client.product(ProductId::new(4)).await.unwrap();
    let review = ctx
        .client
        .create_review(ProductId::new(4), 5, "Lovely")
        .await
        .unwrap();
    ctx.client.product(ProductId::new(4)).await.unwrap();

    assert!(review.verified_purchase);
    assert_eq!(ctx.hits("/products/4").await, 2);
}

#[tokio::test]
async fn test_out_of_range_rating_is_not_sent() {
    let ctx = TestContext::restored(5).await;

    let err = ctx
        .client
        .create_review(ProductId::new(4), 6, "Too good")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Api(_)));
    assert_eq!(ctx.hits("/reviews").await, 0);
}
