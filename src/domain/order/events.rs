use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::core::DomainEvent;
use super::value_objects::{OrderLine, OrderStatus};

// ============================================================================
// Order Events - Domain Events for Order Aggregate
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Created(OrderCreated),
    Revised(OrderRevised),
    ItemSaved(OrderItemSaved),
    StatusChanged(OrderStatusChanged),
}

impl OrderEvent {
    /// Whether applying this event recomputes the order totals.
    /// A bare status change never does.
    pub fn reprices(&self) -> bool {
        !matches!(self, OrderEvent::StatusChanged(_))
    }
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Created(_) => "OrderCreated",
            OrderEvent::Revised(_) => "OrderRevised",
            OrderEvent::ItemSaved(_) => "OrderItemSaved",
            OrderEvent::StatusChanged(_) => "OrderStatusChanged",
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Order Created - header and the initial item set
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCreated {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    pub shipping_cost: Decimal,
    pub lines: Vec<OrderLine>,
}

/// Order Revised - header fields edited and/or items replaced wholesale
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct OrderRevised {
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub discount_percent: Option<Decimal>,
    pub tax_percent: Option<Decimal>,
    pub lines: Option<Vec<OrderLine>>,
}

/// Order Item Saved - one line inserted or its quantity rewritten
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderItemSaved {
    pub line: OrderLine,
}

/// Order Status Changed - only the status column moves
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderStatusChanged {
    pub from: OrderStatus,
    pub to: OrderStatus,
}
