//! Checkout: payment details, simulated payment and order assembly.
//!
//! No payment gateway is involved. Card details are only checked for shape,
//! and a successful "payment" is a generated payment id.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopsphere_core::UserId;
use thiserror::Error;

use crate::api::{CartItem, NewOrder, NewOrderItem};

const PAYMENT_ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Problems with payment details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Please enter a valid 16-digit card number")]
    CardNumber,
    #[error("Please enter a valid expiry date (MM/YY)")]
    Expiry,
    #[error("Please enter a valid 3-digit CVV")]
    Cvv,
    #[error("Please enter the cardholder name")]
    CardholderName,
    #[error("Card details are required for {0}")]
    MissingCard(PaymentMethod),
    #[error("Unknown payment method: {0}")]
    UnknownMethod(String),
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Paypal,
    Cod,
    Upi,
}

impl PaymentMethod {
    /// Wire name sent as `paymentMethod`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Paypal => "paypal",
            Self::Cod => "cod",
            Self::Upi => "upi",
        }
    }

    /// Whether card details must be collected.
    #[must_use]
    pub const fn requires_card(self) -> bool {
        matches!(self, Self::Card | Self::Paypal)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(Self::Card),
            "paypal" => Ok(Self::Paypal),
            "cod" => Ok(Self::Cod),
            "upi" => Ok(Self::Upi),
            other => Err(PaymentError::UnknownMethod(other.to_string())),
        }
    }
}

/// Card details as typed by the customer.
#[derive(Clone, Default)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
    pub holder_name: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits: String = self.number.chars().filter(char::is_ascii_digit).collect();
        let last4 = digits.get(digits.len().saturating_sub(4)..).unwrap_or("");
        f.debug_struct("CardDetails")
            .field("number", &format_args!("**** {last4}"))
            .field("expiry", &self.expiry)
            .field("holder_name", &self.holder_name)
            .finish_non_exhaustive()
    }
}

impl CardDetails {
    /// Check the shape of every field. Spaces in the card number are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first field that is malformed.
    pub fn validate(&self) -> Result<(), PaymentError> {
        let number: String = self.number.chars().filter(|c| !c.is_whitespace()).collect();
        if number.len() != 16 || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PaymentError::CardNumber);
        }

        if !is_expiry(self.expiry.trim()) {
            return Err(PaymentError::Expiry);
        }

        let cvv = self.cvv.trim();
        if cvv.len() != 3 || !cvv.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PaymentError::Cvv);
        }

        if self.holder_name.trim().chars().count() < 3 {
            return Err(PaymentError::CardholderName);
        }

        Ok(())
    }
}

/// `MM/YY` with two digits on each side.
fn is_expiry(s: &str) -> bool {
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    s.split_once('/')
        .is_some_and(|(month, year)| two_digits(month) && two_digits(year))
}

/// Payment method plus card details when the method needs them.
#[derive(Debug, Clone)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub card: Option<CardDetails>,
}

impl PaymentDetails {
    /// # Errors
    ///
    /// Returns an error if the method needs a card and none (or a malformed
    /// one) was given.
    pub fn validate(&self) -> Result<(), PaymentError> {
        if !self.method.requires_card() {
            return Ok(());
        }
        self.card
            .as_ref()
            .ok_or(PaymentError::MissingCard(self.method))?
            .validate()
    }
}

/// Where the order goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingDetails {
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
}

impl ShippingDetails {
    /// Single-line address stored on the order.
    #[must_use]
    pub fn address_line(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.address.trim(),
            self.city.trim(),
            self.zip_code.trim(),
            self.country.trim()
        )
    }

    /// Name of the first empty required field.
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("address", &self.address),
            ("city", &self.city),
            ("zip code", &self.zip_code),
            ("country", &self.country),
            ("phone", &self.phone),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Generate a payment id: `PAY_<unix millis>_<9 base-36 chars>`.
#[must_use]
pub fn payment_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..PAYMENT_ID_SUFFIX_LEN)
        .map(|_| BASE36.choose(&mut rng).map_or('0', |&b| char::from(b)))
        .collect();
    format!("PAY_{}_{suffix}", Utc::now().timestamp_millis())
}

/// Build the order body from a cart snapshot.
#[must_use]
pub fn build_order(
    user: UserId,
    cart: &[CartItem],
    shipping: &ShippingDetails,
    method: PaymentMethod,
    payment_id: Option<String>,
) -> NewOrder {
    let items: Vec<NewOrderItem> = cart
        .iter()
        .map(|line| NewOrderItem {
            product_id: line.product.id,
            quantity: line.quantity,
            price: line.product.price,
        })
        .collect();
    let total_amount: Decimal = cart.iter().map(|line| line.line_total().amount).sum();

    NewOrder {
        user_id: user,
        items,
        total_amount,
        shipping_address: shipping.address_line(),
        payment_method: method.as_str().to_string(),
        phone: shipping.phone.trim().to_string(),
        city: shipping.city.trim().to_string(),
        zip_code: shipping.zip_code.trim().to_string(),
        country: shipping.country.trim().to_string(),
        payment_verified: payment_id.is_some(),
        payment_id,
    }
}
