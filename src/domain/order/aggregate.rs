use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::core::Aggregate;
use super::commands::{CreateOrder, OrderCommand};
use super::errors::OrderError;
use super::events::*;
use super::pricing::{price_lines, PriceBreakdown};
use super::value_objects::{OrderLine, OrderStatus};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// `total` is derived: every event that touches items or header fields is
// followed by recalc_totals() inside apply_event. `shipping_cost` may be
// zeroed by that recompute and stays zeroed.
//
// ============================================================================

const PERCENT_LIMIT: Decimal = Decimal::ONE_HUNDRED;
const MAX_PERCENT_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAggregate {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub items: Vec<OrderLine>,
}

impl OrderAggregate {
    /// Validate a creation command and build the aggregate from it.
    pub fn open(command: CreateOrder) -> Result<(Self, Vec<OrderEvent>), OrderError> {
        validate_percent("discount_percent", command.discount_percent)?;
        validate_percent("tax_percent", command.tax_percent)?;
        validate_lines(&command.lines)?;

        let event = OrderEvent::Created(OrderCreated {
            order_id: Uuid::now_v7(),
            customer_id: command.customer_id,
            status: command.status,
            created_at: Utc::now(),
            discount_percent: command.discount_percent,
            tax_percent: command.tax_percent,
            shipping_cost: command.shipping_cost,
            lines: command.lines,
        });

        let order = Self::apply_first_event(&event)?;
        Ok((order, vec![event]))
    }

    /// Run the pricing engine over the current lines and header fields.
    pub fn recalc_totals(&mut self) -> PriceBreakdown {
        let breakdown = price_lines(
            &self.items,
            self.discount_percent,
            self.tax_percent,
            self.shipping_cost,
        );
        self.shipping_cost = breakdown.shipping_cost;
        self.total = breakdown.total;
        breakdown
    }

    pub fn line_for(&self, product_id: Uuid) -> Option<&OrderLine> {
        self.items.iter().find(|line| line.product.id == product_id)
    }
}

fn validate_percent(field: &'static str, value: Decimal) -> Result<(), OrderError> {
    if value.abs() >= PERCENT_LIMIT || value.normalize().scale() > MAX_PERCENT_SCALE {
        return Err(OrderError::InvalidPercent { field, value });
    }
    Ok(())
}

fn validate_quantity(quantity: i32) -> Result<(), OrderError> {
    if quantity < 0 {
        return Err(OrderError::InvalidQuantity(quantity));
    }
    Ok(())
}

fn validate_lines(lines: &[OrderLine]) -> Result<(), OrderError> {
    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        validate_quantity(line.quantity)?;
        if !seen.insert(line.product.id) {
            return Err(OrderError::DuplicateProduct(line.product.id));
        }
    }
    Ok(())
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for OrderAggregate {
    type Event = OrderEvent;
    type Command = OrderCommand;
    type Error = OrderError;

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            OrderEvent::Created(e) => {
                let mut order = Self {
                    id: e.order_id,
                    customer_id: e.customer_id,
                    status: e.status,
                    created_at: e.created_at,
                    discount_percent: e.discount_percent,
                    tax_percent: e.tax_percent,
                    shipping_cost: e.shipping_cost,
                    total: Decimal::ZERO,
                    items: e.lines.clone(),
                };
                order.recalc_totals();
                Ok(order)
            }
            _ => Err(OrderError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            OrderEvent::Created(_) => {
                // First event already applied
            }
            OrderEvent::Revised(e) => {
                if let Some(customer_id) = e.customer_id {
                    self.customer_id = customer_id;
                }
                if let Some(status) = e.status {
                    self.status = status;
                }
                if let Some(discount_percent) = e.discount_percent {
                    self.discount_percent = discount_percent;
                }
                if let Some(tax_percent) = e.tax_percent {
                    self.tax_percent = tax_percent;
                }
                if let Some(lines) = &e.lines {
                    self.items = lines.clone();
                }
            }
            OrderEvent::ItemSaved(e) => {
                match self.items.iter_mut().find(|line| line.id == e.line.id) {
                    Some(line) => *line = e.line.clone(),
                    None => self.items.push(e.line.clone()),
                }
            }
            OrderEvent::StatusChanged(e) => {
                self.status = e.to;
            }
        }

        if event.reprices() {
            self.recalc_totals();
        }
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::Revise {
                customer_id,
                status,
                discount_percent,
                tax_percent,
                lines,
            } => {
                if let Some(value) = discount_percent {
                    validate_percent("discount_percent", *value)?;
                }
                if let Some(value) = tax_percent {
                    validate_percent("tax_percent", *value)?;
                }
                if let Some(lines) = lines {
                    validate_lines(lines)?;
                }

                Ok(vec![OrderEvent::Revised(OrderRevised {
                    customer_id: *customer_id,
                    status: *status,
                    discount_percent: *discount_percent,
                    tax_percent: *tax_percent,
                    lines: lines.clone(),
                })])
            }

            OrderCommand::SaveItem { product, quantity } => {
                validate_quantity(*quantity)?;

                // An existing line keeps its identity so the store rewrites
                // that row instead of inserting a second one.
                let line = match self.line_for(product.id) {
                    Some(existing) => OrderLine {
                        id: existing.id,
                        product: product.clone(),
                        quantity: *quantity,
                    },
                    None => OrderLine::new(product.clone(), *quantity),
                };

                Ok(vec![OrderEvent::ItemSaved(OrderItemSaved { line })])
            }

            OrderCommand::ChangeStatus { status } => {
                Ok(vec![OrderEvent::StatusChanged(OrderStatusChanged {
                    from: self.status,
                    to: *status,
                })])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }
}
