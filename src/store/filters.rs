use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::customer::Customer;
use crate::domain::order::{OrderAggregate, OrderStatus};
use crate::domain::product::Product;

// ============================================================================
// List Filters
// ============================================================================
//
// Exact-match filters. The in-memory store evaluates them through the
// `matches` helpers; the PostgreSQL store binds the same fields as
// nullable query parameters.
//
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub company_name: Option<String>,
}

impl CustomerFilter {
    pub fn matches(&self, customer: &Customer) -> bool {
        match &self.company_name {
            Some(name) => customer.company_name.as_deref() == Some(name.as_str()),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub is_active: Option<bool>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.is_active.map_or(true, |active| product.is_active == active)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Calendar day of creation (UTC)
    pub created_on: Option<NaiveDate>,
    /// Exact creation timestamp
    pub created_at: Option<DateTime<Utc>>,
    /// Inclusive range of creation days (UTC)
    pub created_between: Option<(NaiveDate, NaiveDate)>,
    pub customer_company_name: Option<String>,
}

impl OrderFilter {
    pub fn created_between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            created_between: Some((start, end)),
            ..Default::default()
        }
    }

    /// `customer_company` is the owning customer's company name, resolved
    /// by the caller.
    pub fn matches(&self, order: &OrderAggregate, customer_company: Option<&str>) -> bool {
        let day = order.created_at.date_naive();

        if self.status.is_some_and(|status| order.status != status) {
            return false;
        }
        if self.created_on.is_some_and(|on| day != on) {
            return false;
        }
        if self.created_at.is_some_and(|at| order.created_at != at) {
            return false;
        }
        if let Some((start, end)) = self.created_between {
            if day < start || day > end {
                return false;
            }
        }
        if let Some(company) = &self.customer_company_name {
            if customer_company != Some(company.as_str()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn order_at(created_at: DateTime<Utc>, status: OrderStatus) -> OrderAggregate {
        OrderAggregate {
            id: Uuid::now_v7(),
            customer_id: Uuid::now_v7(),
            status,
            created_at,
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::ZERO,
            shipping_cost: Decimal::ZERO,
            total: Decimal::ZERO,
            items: vec![],
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_is_inclusive_on_both_ends() {
        let filter = OrderFilter::created_between(day(2024, 3, 1), day(2024, 3, 31));

        let first = order_at(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(), OrderStatus::Draft);
        let last = order_at(Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(), OrderStatus::Draft);
        let after = order_at(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(), OrderStatus::Draft);

        assert!(filter.matches(&first, None));
        assert!(filter.matches(&last, None));
        assert!(!filter.matches(&after, None));
    }

    #[test]
    fn test_reversed_range_matches_nothing() {
        let filter = OrderFilter::created_between(day(2024, 3, 31), day(2024, 3, 1));
        let order = order_at(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(), OrderStatus::Draft);
        assert!(!filter.matches(&order, None));
    }

    #[test]
    fn test_status_and_company_filters() {
        let order = order_at(Utc::now(), OrderStatus::Confirmed);

        let by_status = OrderFilter {
            status: Some(OrderStatus::Draft),
            ..Default::default()
        };
        assert!(!by_status.matches(&order, None));

        let by_company = OrderFilter {
            customer_company_name: Some("Acme".to_string()),
            ..Default::default()
        };
        assert!(by_company.matches(&order, Some("Acme")));
        assert!(!by_company.matches(&order, Some("Globex")));
        assert!(!by_company.matches(&order, None));
    }

    #[test]
    fn test_product_active_filter() {
        let product = Product {
            id: Uuid::now_v7(),
            name: "Widget".to_string(),
            description: None,
            price: Decimal::ONE,
            stock_quantity: 0,
            is_active: false,
        };
        assert!(ProductFilter::default().matches(&product));
        assert!(ProductFilter { is_active: Some(false) }.matches(&product));
        assert!(!ProductFilter { is_active: Some(true) }.matches(&product));
    }
}
