use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::customer::Customer;
use crate::domain::order::OrderAggregate;
use crate::domain::product::Product;
use crate::store::OrderFilter;

// ============================================================================
// Sales Report Aggregation
// ============================================================================
//
// Pure functions over already loaded orders and customers. Orders outside
// [start, end] are dropped here as well, so a reversed range is always
// empty regardless of what the store returned.
//
// ============================================================================

pub const TOP_CUSTOMERS_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct ReportOrder {
    pub order: OrderAggregate,
    pub customer: Option<Customer>,
}

#[derive(Debug, Clone)]
pub struct CustomerRevenue {
    pub customer: Customer,
    pub total: Decimal,
    pub orders: usize,
}

#[derive(Debug, Clone)]
pub struct ProductSales {
    pub product: Product,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct SalesReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub orders: Vec<ReportOrder>,
    pub revenue: Decimal,
    pub orders_count: usize,
    pub top_customers: Vec<CustomerRevenue>,
    pub popular_product: Option<ProductSales>,
}

impl SalesReport {
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

pub fn build_report(
    start: NaiveDate,
    end: NaiveDate,
    orders: Vec<OrderAggregate>,
    customers: &[Customer],
) -> SalesReport {
    let window = OrderFilter::created_between(start, end);
    let by_id: HashMap<Uuid, &Customer> = customers.iter().map(|c| (c.id, c)).collect();

    let orders: Vec<ReportOrder> = orders
        .into_iter()
        .filter(|order| window.matches(order, None))
        .map(|order| ReportOrder {
            customer: by_id.get(&order.customer_id).map(|c| (*c).clone()),
            order,
        })
        .collect();

    let revenue = orders.iter().map(|o| o.order.total).sum();

    SalesReport {
        start,
        end,
        revenue,
        orders_count: orders.len(),
        top_customers: top_customers(&orders, TOP_CUSTOMERS_LIMIT),
        popular_product: popular_product(&orders),
        orders,
    }
}

/// Customers ranked by the sum of their order totals, descending, ties
/// broken by the lower customer id.
pub fn top_customers(orders: &[ReportOrder], limit: usize) -> Vec<CustomerRevenue> {
    let mut ranking: HashMap<Uuid, CustomerRevenue> = HashMap::new();
    for entry in orders {
        let Some(customer) = &entry.customer else {
            continue;
        };
        let slot = ranking.entry(customer.id).or_insert_with(|| CustomerRevenue {
            customer: customer.clone(),
            total: Decimal::ZERO,
            orders: 0,
        });
        slot.total += entry.order.total;
        slot.orders += 1;
    }

    let mut ranking: Vec<CustomerRevenue> = ranking.into_values().collect();
    ranking.sort_by(|a, b| b.total.cmp(&a.total).then(a.customer.id.cmp(&b.customer.id)));
    ranking.truncate(limit);
    ranking
}

/// Product with the largest summed quantity, ties broken by the lower
/// product id. `None` when the orders carry no items.
pub fn popular_product(orders: &[ReportOrder]) -> Option<ProductSales> {
    let mut sales: HashMap<Uuid, ProductSales> = HashMap::new();
    for line in orders.iter().flat_map(|o| &o.order.items) {
        sales
            .entry(line.product.id)
            .or_insert_with(|| ProductSales {
                product: line.product.clone(),
                quantity: 0,
            })
            .quantity += i64::from(line.quantity);
    }

    sales
        .into_values()
        .max_by(|a, b| a.quantity.cmp(&b.quantity).then(b.product.id.cmp(&a.product.id)))
}
