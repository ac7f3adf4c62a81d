//! Status enums shared with the backend.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Advanced server-side; the client only renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    PickedUp,
    InTransit,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Delivery timeline, in order. `Cancelled` is not part of it.
    pub const TIMELINE: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::PickedUp,
        Self::InTransit,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::PickedUp => "Picked up",
            Self::InTransit => "In transit",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether the order can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Position on the delivery timeline, `None` for cancelled orders.
    #[must_use]
    pub fn step(self) -> Option<usize> {
        Self::TIMELINE.iter().position(|s| *s == self)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Account role as reported by the auth endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular shopper.
    #[default]
    User,
    /// Can manage the product catalog.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "USER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_format() {
        let status: OrderStatus = serde_json::from_str("\"OUT_FOR_DELIVERY\"").unwrap();
        assert_eq!(status, OrderStatus::OutForDelivery);
        assert_eq!(
            serde_json::to_string(&OrderStatus::PickedUp).unwrap(),
            "\"PICKED_UP\""
        );
    }

    #[test]
    fn test_order_status_timeline() {
        assert_eq!(OrderStatus::Pending.step(), Some(0));
        assert_eq!(OrderStatus::Delivered.step(), Some(5));
        assert_eq!(OrderStatus::Cancelled.step(), None);
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::InTransit.is_terminal());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "USER");
        assert!("owner".parse::<Role>().is_err());
    }
}
