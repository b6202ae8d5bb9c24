use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::Product;
use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

pub const DEFAULT_TAX_PERCENT: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Draft,
    Confirmed,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Draft,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| OrderError::UnknownStatus(s.to_string()))
    }
}

// ============================================================================
// Status Transitions
// ============================================================================

/// Edges of the order lifecycle. Self-transitions are always allowed and
/// are not listed.
pub const ALLOWED_TRANSITIONS: &[(OrderStatus, OrderStatus)] = &[
    (OrderStatus::Draft, OrderStatus::Confirmed),
    (OrderStatus::Draft, OrderStatus::Cancelled),
    (OrderStatus::Confirmed, OrderStatus::Shipped),
    (OrderStatus::Confirmed, OrderStatus::Cancelled),
];

/// How status changes are checked against [`ALLOWED_TRANSITIONS`].
///
/// `Permissive` lets any status move to any other, including regressions
/// such as shipped -> draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

impl TransitionPolicy {
    pub fn permits(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => from == to || ALLOWED_TRANSITIONS.contains(&(from, to)),
        }
    }

    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if self.permits(from, to) {
            Ok(())
        } else {
            Err(OrderError::TransitionNotAllowed { from, to })
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(format!("unknown status policy \"{other}\"")),
        }
    }
}

// ============================================================================
// Order Line
// ============================================================================

/// One item of an order with its product resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub product: Product,
    pub quantity: i32,
}

impl OrderLine {
    pub fn new(product: Product, quantity: i32) -> Self {
        Self {
            id: Uuid::now_v7(),
            product,
            quantity,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(price: Decimal) -> Product {
        Product {
            id: Uuid::now_v7(),
            name: "Widget".to_string(),
            description: None,
            price,
            stock_quantity: 10,
            is_active: true,
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "delivered".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, OrderError::UnknownStatus(s) if s == "delivered"));
        assert!("Draft".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), "\"cancelled\"");
        let parsed: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(parsed, OrderStatus::Shipped);
    }

    #[test]
    fn test_default_status_is_draft() {
        assert_eq!(OrderStatus::default(), OrderStatus::Draft);
    }

    #[test]
    fn test_permissive_policy_allows_regression() {
        let policy = TransitionPolicy::Permissive;
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(policy.permits(from, to));
            }
        }
    }

    #[test]
    fn test_strict_policy_follows_table() {
        let policy = TransitionPolicy::Strict;
        assert!(policy.permits(OrderStatus::Draft, OrderStatus::Confirmed));
        assert!(policy.permits(OrderStatus::Confirmed, OrderStatus::Shipped));
        assert!(policy.permits(OrderStatus::Shipped, OrderStatus::Shipped));
        assert!(!policy.permits(OrderStatus::Shipped, OrderStatus::Draft));
        assert!(!policy.permits(OrderStatus::Cancelled, OrderStatus::Confirmed));
        assert!(matches!(
            policy.check(OrderStatus::Draft, OrderStatus::Shipped),
            Err(OrderError::TransitionNotAllowed { .. })
        ));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("strict".parse::<TransitionPolicy>().unwrap(), TransitionPolicy::Strict);
        assert_eq!(" Permissive ".parse::<TransitionPolicy>().unwrap(), TransitionPolicy::Permissive);
        assert!("lenient".parse::<TransitionPolicy>().is_err());
    }

    #[test]
    fn test_line_subtotal() {
        let line = OrderLine::new(product(dec!(19.99)), 3);
        assert_eq!(line.subtotal(), dec!(59.97));
    }

    #[test]
    fn test_default_tax_is_twelve() {
        assert_eq!(DEFAULT_TAX_PERCENT, dec!(12));
    }
}
