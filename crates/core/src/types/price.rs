//! Type-safe price representation using decimal arithmetic.
//!
//! The backend stores prices as `BigDecimal` and sends them as bare JSON
//! numbers, so wire types carry a plain [`Decimal`]. [`Price`] pairs an amount
//! with a currency for display.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Smallest display discount, in percent.
pub const MIN_DISCOUNT_PERCENT: u8 = 5;
/// Largest display discount, in percent.
pub const MAX_DISCOUNT_PERCENT: u8 = 50;

/// Errors from price arithmetic.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// A discount of 100% or more has no meaningful original price.
    #[error("discount must be below 100% (got {0}%)")]
    DiscountOutOfRange(u8),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in Indian rupees, the storefront's only currency.
    #[must_use]
    pub const fn inr(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::INR)
    }

    /// The pre-discount price shown struck through next to this one.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::DiscountOutOfRange`] when `discount_percent >= 100`.
    pub fn original(&self, discount_percent: u8) -> Result<Self, PriceError> {
        if discount_percent >= 100 {
            return Err(PriceError::DiscountOutOfRange(discount_percent));
        }
        let remaining = Decimal::ONE - Decimal::from(discount_percent) / Decimal::ONE_HUNDRED;
        Ok(Self::new(self.amount / remaining, self.currency_code))
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:.2}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )
    }
}

/// Display discount for a product, stable per product id.
///
/// Always within `MIN_DISCOUNT_PERCENT..=MAX_DISCOUNT_PERCENT`.
#[must_use]
pub fn discount_percent(product_id: ProductId) -> u8 {
    let span = i64::from(MAX_DISCOUNT_PERCENT - MIN_DISCOUNT_PERCENT + 1);
    let offset = product_id.as_i64().rem_euclid(span);
    // offset < 46, always fits
    u8::try_from(offset).map_or(MIN_DISCOUNT_PERCENT, |o| o + MIN_DISCOUNT_PERCENT)
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Currency symbol used when rendering prices.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_display_inr_two_decimals() {
        assert_eq!(Price::inr(dec("1299")).to_string(), "₹1299.00");
        assert_eq!(Price::inr(dec("49.999")).to_string(), "₹50.00");
    }

    #[test]
    fn test_discount_range() {
        assert_eq!(discount_percent(ProductId::new(0)), 5);
        assert_eq!(discount_percent(ProductId::new(45)), 50);
        assert_eq!(discount_percent(ProductId::new(46)), 5);
        for id in -100..100 {
            let pct = discount_percent(ProductId::new(id));
            assert!((MIN_DISCOUNT_PERCENT..=MAX_DISCOUNT_PERCENT).contains(&pct));
        }
    }

    #[test]
    fn test_original_price() {
        let original = Price::inr(dec("75")).original(25).unwrap();
        assert_eq!(original.amount, dec("100"));
        assert_eq!(
            Price::inr(dec("1")).original(100),
            Err(PriceError::DiscountOutOfRange(100))
        );
    }

    #[test]
    fn test_times() {
        assert_eq!(Price::inr(dec("19.50")).times(3).amount, dec("58.50"));
    }
}
