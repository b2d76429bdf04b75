//! Order status, payment method, and the badge styles used to render them.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Stored as its display name (`"Pending"`, `"Shipped"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The stored and displayed name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Badge style for order tables.
    #[must_use]
    pub const fn badge(&self) -> BadgeVariant {
        match self {
            Self::Pending => BadgeVariant::Secondary,
            Self::Processing | Self::Delivered => BadgeVariant::Default,
            Self::Shipped => BadgeVariant::Outline,
            Self::Cancelled => BadgeVariant::Destructive,
        }
    }

    /// Statuses an admin can move this order to (all but the current one).
    pub fn transitions(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |s| *s != self)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cod,
    Bkash,
    Nagad,
    Rocket,
}

impl PaymentMethod {
    pub const ALL: [Self; 4] = [Self::Cod, Self::Bkash, Self::Nagad, Self::Rocket];

    /// Form and storage value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Bkash => "bkash",
            Self::Nagad => "nagad",
            Self::Rocket => "rocket",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cod => "Cash on Delivery",
            Self::Bkash => "bKash",
            Self::Nagad => "Nagad",
            Self::Rocket => "Rocket",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| "You need to select a payment method.".to_owned())
    }
}

/// Visual style of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Outline,
    Destructive,
}

impl BadgeVariant {
    /// CSS class suffix used by the templates.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Secondary => "secondary",
            Self::Outline => "outline",
            Self::Destructive => "destructive",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_display() {
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("Lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_badges() {
        assert_eq!(OrderStatus::Pending.badge(), BadgeVariant::Secondary);
        assert_eq!(OrderStatus::Processing.badge(), BadgeVariant::Default);
        assert_eq!(OrderStatus::Shipped.badge(), BadgeVariant::Outline);
        assert_eq!(OrderStatus::Delivered.badge(), BadgeVariant::Default);
        assert_eq!(OrderStatus::Cancelled.badge(), BadgeVariant::Destructive);
    }

    #[test]
    fn test_transitions_exclude_current() {
        let next: Vec<_> = OrderStatus::Shipped.transitions().collect();
        assert_eq!(next.len(), 4);
        assert!(!next.contains(&OrderStatus::Shipped));
    }

    #[test]
    fn test_payment_method() {
        assert_eq!("bkash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Bkash);
        assert_eq!(PaymentMethod::Cod.label(), "Cash on Delivery");
        assert_eq!(
            "paypal".parse::<PaymentMethod>().unwrap_err(),
            "You need to select a payment method."
        );
        let json = serde_json::to_string(&PaymentMethod::Rocket).unwrap();
        assert_eq!(json, "\"rocket\"");
    }
}
