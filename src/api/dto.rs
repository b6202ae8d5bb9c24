use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::customer::{Customer, CustomerChanges, NewCustomer};
use crate::domain::order::{LineRequest, OrderAggregate, OrderDraft, OrderLine, OrderRevision, OrderStatus};
use crate::domain::product::{NewProduct, Product, ProductChanges};

use super::error::ApiError;

// ============================================================================
// Request Bodies
// ============================================================================
//
// One body type per resource serves POST, PUT and PATCH. Omitted fields
// leave stored values alone; POST and PUT additionally demand the
// required fields.
//
// ============================================================================

/// Tells an absent field (`None`) apart from an explicit `null`
/// (`Some(None)`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerBody {
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: Option<Option<String>>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub company_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
}

impl CustomerBody {
    pub fn into_new(self) -> Result<NewCustomer, ApiError> {
        let email = self.email.ok_or_else(|| ApiError::required("email"))?;
        Ok(NewCustomer {
            full_name: self.full_name.flatten(),
            email,
            company_name: self.company_name.flatten(),
            phone: self.phone.flatten(),
        })
    }

    pub fn into_replacement(self) -> Result<CustomerChanges, ApiError> {
        if self.email.is_none() {
            return Err(ApiError::required("email"));
        }
        Ok(self.into_changes())
    }

    pub fn into_changes(self) -> CustomerChanges {
        CustomerChanges {
            full_name: self.full_name,
            email: self.email,
            company_name: self.company_name,
            phone: self.phone,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductBody {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub is_active: Option<bool>,
}

impl ProductBody {
    pub fn into_new(self) -> Result<NewProduct, ApiError> {
        let name = self.name.ok_or_else(|| ApiError::required("name"))?;
        Ok(NewProduct {
            name,
            description: self.description.flatten(),
            price: self.price,
            stock_quantity: self.stock_quantity,
            is_active: self.is_active,
        })
    }

    pub fn into_replacement(self) -> Result<ProductChanges, ApiError> {
        if self.name.is_none() {
            return Err(ApiError::required("name"));
        }
        Ok(self.into_changes())
    }

    pub fn into_changes(self) -> ProductChanges {
        ProductChanges {
            name: self.name,
            description: self.description,
            price: self.price,
            stock_quantity: self.stock_quantity,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderBody {
    pub customer: Option<Uuid>,
    pub status: Option<String>,
    pub discount_percent: Option<Decimal>,
    pub tax_percent: Option<Decimal>,
    pub items: Option<Vec<LineRequest>>,
}

impl OrderBody {
    pub fn into_draft(self) -> Result<OrderDraft, ApiError> {
        let status = parse_status(self.status.as_deref())?;
        Ok(OrderDraft {
            customer_id: self.customer.ok_or_else(|| ApiError::required("customer"))?,
            items: self.items.ok_or_else(|| ApiError::required("items"))?,
            status,
            discount_percent: self.discount_percent,
            tax_percent: self.tax_percent,
        })
    }

    pub fn into_replacement(self) -> Result<OrderRevision, ApiError> {
        if self.customer.is_none() {
            return Err(ApiError::required("customer"));
        }
        if self.items.is_none() {
            return Err(ApiError::required("items"));
        }
        self.into_revision()
    }

    pub fn into_revision(self) -> Result<OrderRevision, ApiError> {
        Ok(OrderRevision {
            status: parse_status(self.status.as_deref())?,
            customer_id: self.customer,
            discount_percent: self.discount_percent,
            tax_percent: self.tax_percent,
            items: self.items,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: Option<String>,
}

impl StatusBody {
    pub fn status(&self) -> Result<OrderStatus, ApiError> {
        parse_status(self.status.as_deref())?.ok_or_else(|| ApiError::required("status"))
    }
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct ItemBody {
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn parse_status(raw: Option<&str>) -> Result<Option<OrderStatus>, ApiError> {
    raw.map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(|e| ApiError::validation(format!("status: {e}")))
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product: Uuid,
    pub product_detail: Product,
    pub quantity: i32,
    pub subtotal: Decimal,
}

impl From<OrderLine> for OrderItemResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            id: line.id,
            product: line.product.id,
            subtotal: line.subtotal(),
            quantity: line.quantity,
            product_detail: line.product,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer: Uuid,
    pub customer_detail: Option<Customer>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub items: Vec<OrderItemResponse>,
}

impl OrderResponse {
    pub fn new(order: OrderAggregate, customer: Option<Customer>) -> Self {
        Self {
            id: order.id,
            customer: order.customer_id,
            customer_detail: customer,
            status: order.status,
            created_at: order.created_at,
            discount_percent: order.discount_percent,
            tax_percent: order.tax_percent,
            shipping_cost: order.shipping_cost,
            total: order.total,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_fields() {
        let body: CustomerBody =
            serde_json::from_str(r#"{"email": "a@example.com", "company_name": null}"#).unwrap();
        let changes = body.into_changes();

        assert_eq!(changes.company_name, Some(None));
        assert_eq!(changes.full_name, None);
        assert_eq!(changes.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_customer_put_requires_email() {
        let body: CustomerBody = serde_json::from_str(r#"{"full_name": "Ivan"}"#).unwrap();
        let err = body.into_replacement().unwrap_err();
        assert_eq!(err.to_string(), "email: This field is required.");
    }

    #[test]
    fn test_order_draft_requires_items() {
        let body: OrderBody =
            serde_json::from_str(r#"{"customer": "0192a1b2-0000-7000-8000-000000000001"}"#).unwrap();
        assert_eq!(body.into_draft().unwrap_err().to_string(), "items: This field is required.");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let body: OrderBody = serde_json::from_str(r#"{"status": "lost"}"#).unwrap();
        assert!(matches!(body.into_revision().unwrap_err(), ApiError::Validation(_)));
    }

    #[test]
    fn test_item_quantity_defaults_to_one() {
        let body: ItemBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.quantity, 1);
    }

    #[test]
    fn test_line_quantity_defaults_to_one() {
        let body: OrderBody = serde_json::from_str(
            r#"{"items": [{"product": "0192a1b2-0000-7000-8000-000000000002"}]}"#,
        )
        .unwrap();
        assert_eq!(body.items.unwrap()[0].quantity, 1);
    }
}
