use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::product::Product;
use super::value_objects::{OrderLine, OrderStatus};

// ============================================================================
// Order Requests - caller intent before catalog references are resolved
// ============================================================================

fn default_quantity() -> i32 {
    1
}

/// `{product, quantity}` as accepted on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct LineRequest {
    #[serde(rename = "product")]
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_id: Uuid,
    pub status: Option<OrderStatus>,
    pub discount_percent: Option<Decimal>,
    pub tax_percent: Option<Decimal>,
    pub items: Vec<LineRequest>,
}

/// Edit of an existing order. `items: None` keeps the current lines.
#[derive(Debug, Clone, Default)]
pub struct OrderRevision {
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub discount_percent: Option<Decimal>,
    pub tax_percent: Option<Decimal>,
    pub items: Option<Vec<LineRequest>>,
}

// ============================================================================
// Order Commands - resolved intent handled by the aggregate
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    pub shipping_cost: Decimal,
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone)]
pub enum OrderCommand {
    Revise {
        customer_id: Option<Uuid>,
        status: Option<OrderStatus>,
        discount_percent: Option<Decimal>,
        tax_percent: Option<Decimal>,
        lines: Option<Vec<OrderLine>>,
    },
    SaveItem {
        product: Product,
        quantity: i32,
    },
    ChangeStatus {
        status: OrderStatus,
    },
}
