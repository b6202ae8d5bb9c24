use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::customer::Customer;
use crate::domain::order::{OrderAggregate, OrderEvent, OrderLine, OrderStatus};
use crate::domain::product::Product;

use super::{
    CatalogStore, CustomerFilter, OrderFilter, OrderStore, ProductFilter, Store, StoreError,
    StoreResult,
};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// Rows are kept the way the relational schema keeps them: order headers
// and item rows separately, items pointing at products by id. Every write
// works on a copy of the state that replaces the original only when the
// whole operation succeeded, which gives commit() transaction semantics.
//
// ============================================================================

#[derive(Debug, Clone)]
struct OrderHeader {
    id: Uuid,
    customer_id: Uuid,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    discount_percent: Decimal,
    tax_percent: Decimal,
    shipping_cost: Decimal,
    total: Decimal,
}

impl OrderHeader {
    fn from_aggregate(order: &OrderAggregate) -> Self {
        Self {
            id: order.id,
            customer_id: order.customer_id,
            status: order.status,
            created_at: order.created_at,
            discount_percent: order.discount_percent,
            tax_percent: order.tax_percent,
            shipping_cost: order.shipping_cost,
            total: order.total,
        }
    }
}

#[derive(Debug, Clone)]
struct ItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}

#[derive(Debug, Clone, Default)]
struct State {
    customers: HashMap<Uuid, Customer>,
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, OrderHeader>,
    /// Insertion ordered, like the `position` column.
    items: Vec<ItemRow>,
}

impl State {
    fn check_email_free(&self, customer: &Customer) -> StoreResult<()> {
        let taken = self
            .customers
            .values()
            .any(|other| other.id != customer.id && other.email == customer.email);
        if taken {
            return Err(StoreError::Conflict("customers_email_key".to_string()));
        }
        Ok(())
    }

    fn write_header(&mut self, order: &OrderAggregate) -> StoreResult<()> {
        if !self.customers.contains_key(&order.customer_id) {
            return Err(StoreError::MissingReference("orders_customer_id_fkey".to_string()));
        }
        self.orders.insert(order.id, OrderHeader::from_aggregate(order));
        Ok(())
    }

    fn write_totals(&mut self, order: &OrderAggregate) -> StoreResult<()> {
        let header = self
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| StoreError::not_found("order", order.id))?;
        header.total = order.total;
        header.shipping_cost = order.shipping_cost;
        Ok(())
    }

    /// Insert or rewrite one item row, then apply the confirmed-order
    /// stock decrement against the header as currently stored.
    fn write_item(&mut self, order_id: Uuid, line: &OrderLine) -> StoreResult<()> {
        let product_id = line.product.id;
        if !self.products.contains_key(&product_id) {
            return Err(StoreError::MissingReference("order_items_product_id_fkey".to_string()));
        }
        let duplicate = self
            .items
            .iter()
            .any(|row| row.order_id == order_id && row.product_id == product_id && row.id != line.id);
        if duplicate {
            return Err(StoreError::Conflict("order_items_order_id_product_id_key".to_string()));
        }

        match self.items.iter_mut().find(|row| row.id == line.id) {
            Some(row) => row.quantity = line.quantity,
            None => self.items.push(ItemRow {
                id: line.id,
                order_id,
                product_id,
                quantity: line.quantity,
            }),
        }

        let confirmed = self
            .orders
            .get(&order_id)
            .is_some_and(|header| header.status == OrderStatus::Confirmed);
        if confirmed {
            if let Some(product) = self.products.get_mut(&product_id) {
                product.stock_quantity = product
                    .stock_quantity
                    .checked_sub(line.quantity)
                    .ok_or_else(|| StoreError::OutOfRange(format!("stock of product {product_id}")))?;
            }
        }
        Ok(())
    }

    fn assemble(&self, header: &OrderHeader) -> StoreResult<OrderAggregate> {
        let items = self
            .items
            .iter()
            .filter(|row| row.order_id == header.id)
            .map(|row| {
                let product = self.products.get(&row.product_id).ok_or_else(|| {
                    StoreError::Corrupt(format!("order item {} has no product", row.id))
                })?;
                Ok(OrderLine {
                    id: row.id,
                    product: product.clone(),
                    quantity: row.quantity,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(OrderAggregate {
            id: header.id,
            customer_id: header.customer_id,
            status: header.status,
            created_at: header.created_at,
            discount_percent: header.discount_percent,
            tax_percent: header.tax_percent,
            shipping_cost: header.shipping_cost,
            total: header.total,
            items,
        })
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }

    /// Run `f` against a scratch copy and keep the result only on success.
    fn transaction<T>(&self, f: impl FnOnce(&mut State) -> StoreResult<T>) -> StoreResult<T> {
        let mut state = self.write()?;
        let mut scratch = (*state).clone();
        let value = f(&mut scratch)?;
        *state = scratch;
        Ok(value)
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()> {
        self.transaction(|state| {
            state.check_email_free(customer)?;
            state.customers.insert(customer.id, customer.clone());
            Ok(())
        })
    }

    async fn update_customer(&self, customer: &Customer) -> StoreResult<()> {
        self.transaction(|state| {
            if !state.customers.contains_key(&customer.id) {
                return Err(StoreError::not_found("customer", customer.id));
            }
            state.check_email_free(customer)?;
            state.customers.insert(customer.id, customer.clone());
            Ok(())
        })
    }

    async fn get_customer(&self, id: Uuid) -> StoreResult<Option<Customer>> {
        Ok(self.read()?.customers.get(&id).cloned())
    }

    async fn list_customers(&self, filter: &CustomerFilter) -> StoreResult<Vec<Customer>> {
        let state = self.read()?;
        let mut customers: Vec<Customer> = state
            .customers
            .values()
            .filter(|customer| filter.matches(customer))
            .cloned()
            .collect();
        customers.sort_by_key(|customer| (customer.created_at, customer.id));
        Ok(customers)
    }

    async fn customers_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Customer>> {
        let state = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.customers.get(id).cloned())
            .collect())
    }

    async fn delete_customer(&self, id: Uuid) -> StoreResult<bool> {
        self.transaction(|state| {
            if state.customers.remove(&id).is_none() {
                return Ok(false);
            }
            let owned: Vec<Uuid> = state
                .orders
                .values()
                .filter(|header| header.customer_id == id)
                .map(|header| header.id)
                .collect();
            for order_id in &owned {
                state.orders.remove(order_id);
            }
            state.items.retain(|row| !owned.contains(&row.order_id));
            Ok(true)
        })
    }

    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        self.transaction(|state| {
            state.products.insert(product.id, product.clone());
            Ok(())
        })
    }

    async fn update_product(&self, product: &Product) -> StoreResult<()> {
        self.transaction(|state| match state.products.get_mut(&product.id) {
            Some(stored) => {
                *stored = product.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("product", product.id)),
        })
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let state = self.read()?;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect();
        products.sort_by_key(|product| product.id);
        Ok(products)
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
        self.transaction(|state| {
            if state.items.iter().any(|row| row.product_id == id) {
                return Err(StoreError::Protected("order_items_product_id_fkey".to_string()));
            }
            Ok(state.products.remove(&id).is_some())
        })
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn commit(&self, order: &OrderAggregate, events: &[OrderEvent]) -> StoreResult<()> {
        self.transaction(|state| {
            for event in events {
                match event {
                    OrderEvent::Created(e) => {
                        state.write_header(order)?;
                        for line in &e.lines {
                            state.write_item(order.id, line)?;
                        }
                    }
                    OrderEvent::Revised(e) => {
                        state.write_header(order)?;
                        if let Some(lines) = &e.lines {
                            state.items.retain(|row| row.order_id != order.id);
                            for line in lines {
                                state.write_item(order.id, line)?;
                            }
                        }
                    }
                    OrderEvent::ItemSaved(e) => {
                        state.write_item(order.id, &e.line)?;
                        state.write_totals(order)?;
                    }
                    OrderEvent::StatusChanged(e) => match state.orders.get_mut(&order.id) {
                        Some(header) => header.status = e.to,
                        None => return Err(StoreError::not_found("order", order.id)),
                    },
                }
            }
            Ok(())
        })
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<OrderAggregate>> {
        let state = self.read()?;
        state.orders.get(&id).map(|header| state.assemble(header)).transpose()
    }

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<OrderAggregate>> {
        let state = self.read()?;
        let mut headers: Vec<&OrderHeader> = state.orders.values().collect();
        headers.sort_by_key(|header| (header.created_at, header.id));

        let mut orders = Vec::new();
        for header in headers {
            let order = state.assemble(header)?;
            let company = state
                .customers
                .get(&order.customer_id)
                .and_then(|customer| customer.company_name.as_deref());
            if filter.matches(&order, company) {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        self.transaction(|state| {
            if state.orders.remove(&id).is_none() {
                return Ok(false);
            }
            state.items.retain(|row| row.order_id != id);
            Ok(true)
        })
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }
}
