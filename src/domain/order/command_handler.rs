use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::core::Aggregate;
use crate::domain::errors::{DomainError, DomainResult};
use crate::metrics::Metrics;
use crate::store::Store;

use super::aggregate::OrderAggregate;
use super::commands::{CreateOrder, LineRequest, OrderCommand, OrderDraft, OrderRevision};
use super::errors::OrderError;
use super::events::OrderEvent;
use super::value_objects::{OrderLine, OrderStatus, TransitionPolicy, DEFAULT_TAX_PERCENT};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Request → resolve catalog refs → Aggregate → Events → Store
//
// The store translates the events into row writes inside one transaction;
// the order is then reloaded so callers see products as persisted.
//
// ============================================================================

pub struct OrderCommandHandler {
    store: Arc<dyn Store>,
    policy: TransitionPolicy,
    default_shipping_cost: Decimal,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(
        store: Arc<dyn Store>,
        policy: TransitionPolicy,
        default_shipping_cost: Decimal,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            policy,
            default_shipping_cost,
            metrics,
        }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub async fn create(&self, draft: OrderDraft) -> DomainResult<OrderAggregate> {
        let result = self.try_create(draft).await;
        self.observe("create_order", result)
    }

    pub async fn revise(&self, id: Uuid, revision: OrderRevision) -> DomainResult<OrderAggregate> {
        let result = self.try_revise(id, revision).await;
        self.observe("revise_order", result)
    }

    /// Set only the status. Totals and stock are left alone.
    pub async fn change_status(&self, id: Uuid, status: OrderStatus) -> DomainResult<OrderAggregate> {
        let result = self.try_change_status(id, status).await;
        self.observe("change_order_status", result)
    }

    /// Insert or rewrite the order's line for `product_id`.
    pub async fn save_item(&self, id: Uuid, product_id: Uuid, quantity: i32) -> DomainResult<OrderAggregate> {
        let result = self.try_save_item(id, product_id, quantity).await;
        self.observe("save_order_item", result)
    }

    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        if !self.store.delete_order(id).await? {
            return self.observe("delete_order", Err(DomainError::not_found("order", id)));
        }
        info!(order_id = %id, "Order deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------

    async fn try_create(&self, draft: OrderDraft) -> DomainResult<OrderAggregate> {
        self.ensure_customer(draft.customer_id).await?;
        let lines = self.resolve_lines(&draft.items).await?;

        let (order, events) = OrderAggregate::open(CreateOrder {
            customer_id: draft.customer_id,
            status: draft.status.unwrap_or_default(),
            discount_percent: draft.discount_percent.unwrap_or(Decimal::ZERO),
            tax_percent: draft.tax_percent.unwrap_or(DEFAULT_TAX_PERCENT),
            shipping_cost: self.default_shipping_cost,
            lines,
        })?;

        let order = self.persist(&order, &events).await?;
        info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            status = %order.status,
            items = order.items.len(),
            total = %order.total,
            "Order created"
        );
        Ok(order)
    }

    async fn try_revise(&self, id: Uuid, revision: OrderRevision) -> DomainResult<OrderAggregate> {
        let mut order = self.load(id).await?;

        if let Some(status) = revision.status {
            self.policy.check(order.status, status)?;
        }
        if let Some(customer_id) = revision.customer_id {
            self.ensure_customer(customer_id).await?;
        }
        let lines = match &revision.items {
            Some(requests) => Some(self.resolve_lines(requests).await?),
            None => None,
        };

        let events = order.execute(&OrderCommand::Revise {
            customer_id: revision.customer_id,
            status: revision.status,
            discount_percent: revision.discount_percent,
            tax_percent: revision.tax_percent,
            lines,
        })?;

        let order = self.persist(&order, &events).await?;
        info!(order_id = %id, status = %order.status, total = %order.total, "Order revised");
        Ok(order)
    }

    async fn try_change_status(&self, id: Uuid, status: OrderStatus) -> DomainResult<OrderAggregate> {
        let mut order = self.load(id).await?;
        let from = order.status;
        self.policy.check(from, status)?;

        let events = order.execute(&OrderCommand::ChangeStatus { status })?;
        let order = self.persist(&order, &events).await?;

        info!(order_id = %id, from = %from, to = %status, "Order status changed");
        Ok(order)
    }

    async fn try_save_item(&self, id: Uuid, product_id: Uuid, quantity: i32) -> DomainResult<OrderAggregate> {
        let mut order = self.load(id).await?;
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", product_id))?;

        let events = order.execute(&OrderCommand::SaveItem { product, quantity })?;
        let order = self.persist(&order, &events).await?;

        info!(
            order_id = %id,
            product_id = %product_id,
            quantity,
            total = %order.total,
            "Order item saved"
        );
        Ok(order)
    }

    async fn load(&self, id: Uuid) -> DomainResult<OrderAggregate> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(|| DomainError::not_found("order", id))
    }

    async fn ensure_customer(&self, id: Uuid) -> DomainResult<()> {
        match self.store.get_customer(id).await? {
            Some(_) => Ok(()),
            None => Err(OrderError::UnknownCustomer(id).into()),
        }
    }

    async fn resolve_lines(&self, requests: &[LineRequest]) -> DomainResult<Vec<OrderLine>> {
        let mut lines = Vec::with_capacity(requests.len());
        for request in requests {
            let product = self
                .store
                .get_product(request.product_id)
                .await?
                .ok_or(OrderError::UnknownProduct(request.product_id))?;
            lines.push(OrderLine::new(product, request.quantity));
        }
        Ok(lines)
    }

    async fn persist(&self, order: &OrderAggregate, events: &[OrderEvent]) -> DomainResult<OrderAggregate> {
        self.store.commit(order, events).await?;
        self.metrics.record_order_events(events);
        self.load(order.id).await
    }

    fn observe<T>(&self, operation: &str, result: DomainResult<T>) -> DomainResult<T> {
        if let Err(e) = &result {
            let reason = match e {
                DomainError::NotFound { .. } => "not_found",
                e if e.is_validation() => "validation",
                _ => "store",
            };
            self.metrics.record_command_failure(operation, reason);
            warn!(operation, reason, error = %e, "Order command failed");
        }
        result
    }
}
