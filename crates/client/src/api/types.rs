//! Wire types for the ShopSphere REST API.
//!
//! Field names follow the backend's camelCase JSON. Optional fields are
//! optional because the backend omits or nulls them for older records.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopsphere_core::{
    CartItemId, Email, OrderId, OrderItemId, OrderStatus, Price, ProductId, ReviewId, Role,
    UserId,
};

// =============================================================================
// Users
// =============================================================================

/// Authenticated user as returned by login, register and validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl User {
    /// Name to greet the user with, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            self.email.to_string()
        } else {
            parts.join(" ")
        }
    }

    /// Whether the user may use the product management endpoints.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// Extended profile from `GET /auth/profile/{userId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// Body of a successful login or registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Body of a successful token validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// New account details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Email,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// =============================================================================
// Products
// =============================================================================

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<i32>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Product {
    /// Price in the storefront currency.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::inr(self.price)
    }

    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|s| s > 0)
    }
}

/// Admin payload for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
}

// =============================================================================
// Cart
// =============================================================================

/// Product summary embedded in cart lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// One line of a user's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: CartProduct,
    pub quantity: u32,
}

impl CartItem {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::inr(self.product.price).times(self.quantity)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    #[serde(default)]
    pub product: Option<Product>,
    pub quantity: u32,
    pub price: Decimal,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub delivered_date: Option<NaiveDateTime>,
}

impl Order {
    /// Total in the storefront currency.
    #[must_use]
    pub const fn total(&self) -> Price {
        Price::inr(self.total_amount)
    }
}

/// Line of a new order, priced from the cart snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<NewOrderItem>,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub payment_method: String,
    pub phone: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
    pub payment_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

// =============================================================================
// Wishlist and reviews
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WishlistCheck {
    pub is_in_wishlist: bool,
}

/// A product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub verified_purchase: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Body of `POST /reviews` and `PUT /reviews/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub rating: u8,
    pub comment: String,
}

/// Answer of `GET /reviews/can-review/{productId}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEligibility {
    pub can_review: bool,
    /// Why the user may not review, e.g. no purchase or already reviewed.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Error body shape used by every backend controller.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Extract the backend's error message from a raw body.
    pub(crate) fn message_from(body: &str) -> Option<String> {
        let parsed: Self = serde_json::from_str(body).ok()?;
        parsed
            .error
            .or(parsed.message)
            .filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_user_from_backend_json() {
        let user: User = serde_json::from_str(
            r#"{"id":7,"email":"asha@example.com","firstName":"Asha","lastName":"Rao","role":"ADMIN"}"#,
        )
        .unwrap();
        assert_eq!(user.id, UserId::new(7));
        assert_eq!(user.display_name(), "Asha Rao");
        assert!(user.is_admin());
    }

    #[test]
    fn test_user_display_name_fallback() {
        let user: User = serde_json::from_str(r#"{"id":1,"email":"x@y.io","firstName":"  "}"#).unwrap();
        assert_eq!(user.display_name(), "x@y.io");
        assert!(!user.is_admin());
    }

    #[test]
    fn test_product_accepts_numeric_price() {
        let product: Product = serde_json::from_str(
            r#"{"id":3,"name":"Kettle","price":1499.5,"stock":0,"createdAt":"2024-05-01T10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(product.price, Decimal::from_str("1499.5").unwrap());
        assert!(!product.in_stock());
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_cart_line_total() {
        let item: CartItem = serde_json::from_str(
            r#"{"id":1,"product":{"id":2,"name":"Mug","price":250},"quantity":3}"#,
        )
        .unwrap();
        assert_eq!(item.line_total().to_string(), "₹750.00");
    }

    #[test]
    fn test_order_defaults_missing_fields() {
        let order: Order = serde_json::from_str(r#"{"id":10,"totalAmount":99}"#).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.order_items.is_empty());
    }

    #[test]
    fn test_new_order_wire_names() {
        let order = NewOrder {
            user_id: UserId::new(1),
            items: vec![NewOrderItem {
                product_id: ProductId::new(4),
                quantity: 2,
                price: Decimal::from(10),
            }],
            total_amount: Decimal::from(20),
            shipping_address: "1 Main St".into(),
            payment_method: "cod".into(),
            phone: "999".into(),
            city: "Pune".into(),
            zip_code: "411001".into(),
            country: "India".into(),
            payment_verified: false,
            payment_id: None,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["items"][0]["productId"], 4);
        assert_eq!(json["zipCode"], "411001");
        assert!(json.get("paymentId").is_none());
    }

    #[test]
    fn test_error_body_message() {
        assert_eq!(
            ErrorBody::message_from(r#"{"error":"Invalid or expired token"}"#).as_deref(),
            Some("Invalid or expired token")
        );
        assert_eq!(
            ErrorBody::message_from(r#"{"message":"Bad input"}"#).as_deref(),
            Some("Bad input")
        );
        assert_eq!(ErrorBody::message_from("<html>").as_deref(), None);
    }
}
