use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::domain::customer::{Customer, Email, PhoneNumber};
use crate::domain::order::{OrderAggregate, OrderEvent, OrderLine, OrderStatus};
use crate::domain::product::Product;

use super::{
    CatalogStore, CustomerFilter, OrderFilter, OrderStore, ProductFilter, Store, StoreError,
    StoreResult,
};

// ============================================================================
// PostgreSQL Store
// ============================================================================
//
// Schema lives in migrations/. Order commits run in one transaction:
// the header row is upserted first, then item rows, each followed by the
// guarded stock decrement so it observes the stored status. Item saves
// skip the upsert and only refresh the totals.
//
// ============================================================================

const DECREMENT_STOCK: &str = r#"
    UPDATE products
    SET stock_quantity = stock_quantity - $1
    WHERE id = $2
      AND EXISTS (SELECT 1 FROM orders WHERE id = $3 AND status = 'confirmed')
"#;

const UPSERT_ORDER: &str = r#"
    INSERT INTO orders
        (id, customer_id, status, created_at, discount_percent, tax_percent, shipping_cost, total)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (id) DO UPDATE SET
        customer_id = EXCLUDED.customer_id,
        status = EXCLUDED.status,
        discount_percent = EXCLUDED.discount_percent,
        tax_percent = EXCLUDED.tax_percent,
        shipping_cost = EXCLUDED.shipping_cost,
        total = EXCLUDED.total
"#;

/// Item saves only touch the derived columns; the rest of the header may
/// have moved on since the order was loaded.
const UPDATE_TOTALS: &str = "UPDATE orders SET total = $2, shipping_cost = $3 WHERE id = $1";

const UPSERT_ITEM: &str = r#"
    INSERT INTO order_items (id, order_id, product_id, quantity, position)
    VALUES (
        $1, $2, $3, $4,
        (SELECT COALESCE(MAX(position) + 1, 0) FROM order_items WHERE order_id = $2)
    )
    ON CONFLICT (id) DO UPDATE SET quantity = EXCLUDED.quantity
"#;

const SELECT_ITEMS: &str = r#"
    SELECT i.id, i.order_id, i.quantity,
           p.id AS product_id, p.name, p.description, p.price, p.stock_quantity, p.is_active
    FROM order_items i
    JOIN products p ON p.id = i.product_id
    WHERE i.order_id = ANY($1)
    ORDER BY i.order_id, i.position
"#;

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, FromRow)]
struct CustomerRow {
    id: Uuid,
    full_name: Option<String>,
    email: String,
    company_name: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            full_name: row.full_name,
            email: Email::from_stored(row.email),
            company_name: row.company_name,
            phone: row.phone.map(PhoneNumber::from_stored),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock_quantity: i32,
    is_active: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock_quantity: row.stock_quantity,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    customer_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    discount_percent: Decimal,
    tax_percent: Decimal,
    shipping_cost: Decimal,
    total: Decimal,
}

impl OrderRow {
    fn into_aggregate(self, items: Vec<OrderLine>) -> StoreResult<OrderAggregate> {
        let status: OrderStatus = self
            .status
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("order {} has status {:?}", self.id, self.status)))?;

        Ok(OrderAggregate {
            id: self.id,
            customer_id: self.customer_id,
            status,
            created_at: self.created_at,
            discount_percent: self.discount_percent,
            tax_percent: self.tax_percent,
            shipping_cost: self.shipping_cost,
            total: self.total,
            items,
        })
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    order_id: Uuid,
    quantity: i32,
    product_id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock_quantity: i32,
    is_active: bool,
}

impl From<ItemRow> for OrderLine {
    fn from(row: ItemRow) -> Self {
        OrderLine {
            id: row.id,
            product: Product {
                id: row.product_id,
                name: row.name,
                description: row.description,
                price: row.price,
                stock_quantity: row.stock_quantity,
                is_active: row.is_active,
            },
            quantity: row.quantity,
        }
    }
}

/// Translate constraint violations; `on_foreign_key` decides what a
/// foreign key violation means for the statement at hand.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

fn classify(err: sqlx::Error, on_foreign_key: fn(String) -> StoreError) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        let constraint = db.constraint().unwrap_or("unnamed").to_string();
        if db.is_unique_violation() {
            return StoreError::Conflict(constraint);
        }
        if db.is_foreign_key_violation() {
            return on_foreign_key(constraint);
        }
        if db.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
            return StoreError::OutOfRange(db.message().to_string());
        }
    }
    StoreError::Database(err)
}

fn on_write(err: sqlx::Error) -> StoreError {
    classify(err, StoreError::MissingReference)
}

// ============================================================================
// Store
// ============================================================================

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn write_header(conn: &mut PgConnection, order: &OrderAggregate) -> StoreResult<()> {
        sqlx::query(UPSERT_ORDER)
            .bind(order.id)
            .bind(order.customer_id)
            .bind(order.status.as_str())
            .bind(order.created_at)
            .bind(order.discount_percent)
            .bind(order.tax_percent)
            .bind(order.shipping_cost)
            .bind(order.total)
            .execute(conn)
            .await
            .map_err(on_write)?;
        Ok(())
    }

    async fn write_totals(conn: &mut PgConnection, order: &OrderAggregate) -> StoreResult<()> {
        let updated = sqlx::query(UPDATE_TOTALS)
            .bind(order.id)
            .bind(order.total)
            .bind(order.shipping_cost)
            .execute(conn)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(StoreError::not_found("order", order.id));
        }
        Ok(())
    }

    async fn write_item(conn: &mut PgConnection, order_id: Uuid, line: &OrderLine) -> StoreResult<()> {
        sqlx::query(UPSERT_ITEM)
            .bind(line.id)
            .bind(order_id)
            .bind(line.product.id)
            .bind(line.quantity)
            .execute(&mut *conn)
            .await
            .map_err(on_write)?;

        let decremented = sqlx::query(DECREMENT_STOCK)
            .bind(line.quantity)
            .bind(line.product.id)
            .bind(order_id)
            .execute(&mut *conn)
            .await
            .map_err(on_write)?
            .rows_affected();

        if decremented > 0 {
            debug!(
                order_id = %order_id,
                product_id = %line.product.id,
                quantity = line.quantity,
                "Stock decremented for confirmed order"
            );
        }
        Ok(())
    }

    async fn load_items(&self, order_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<OrderLine>>> {
        let rows: Vec<ItemRow> = sqlx::query_as(SELECT_ITEMS)
            .bind(order_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut items: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            items.entry(row.order_id).or_default().push(row.into());
        }
        Ok(items)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO customers (id, full_name, email, company_name, phone, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(customer.id)
        .bind(customer.full_name.as_deref())
        .bind(customer.email.as_str())
        .bind(customer.company_name.as_deref())
        .bind(customer.phone.as_ref().map(PhoneNumber::as_str))
        .bind(customer.created_at)
        .execute(&self.pool)
        .await
        .map_err(on_write)?;
        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> StoreResult<()> {
        let updated = sqlx::query(
            "UPDATE customers SET full_name = $2, email = $3, company_name = $4, phone = $5 \
             WHERE id = $1",
        )
        .bind(customer.id)
        .bind(customer.full_name.as_deref())
        .bind(customer.email.as_str())
        .bind(customer.company_name.as_deref())
        .bind(customer.phone.as_ref().map(PhoneNumber::as_str))
        .execute(&self.pool)
        .await
        .map_err(on_write)?
        .rows_affected();

        if updated == 0 {
            return Err(StoreError::not_found("customer", customer.id));
        }
        Ok(())
    }

    async fn get_customer(&self, id: Uuid) -> StoreResult<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Customer::from))
    }

    async fn list_customers(&self, filter: &CustomerFilter) -> StoreResult<Vec<Customer>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(
            "SELECT * FROM customers \
             WHERE ($1::text IS NULL OR company_name = $1) \
             ORDER BY created_at, id",
        )
        .bind(filter.company_name.as_deref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn customers_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Customer>> {
        let rows: Vec<CustomerRow> = sqlx::query_as("SELECT * FROM customers WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn delete_customer(&self, id: Uuid) -> StoreResult<bool> {
        let deleted = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO products (id, name, description, price, stock_quantity, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(product.price)
        .bind(product.stock_quantity)
        .bind(product.is_active)
        .execute(&self.pool)
        .await
        .map_err(on_write)?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> StoreResult<()> {
        let updated = sqlx::query(
            "UPDATE products SET name = $2, description = $3, price = $4, \
             stock_quantity = $5, is_active = $6 WHERE id = $1",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(product.price)
        .bind(product.stock_quantity)
        .bind(product.is_active)
        .execute(&self.pool)
        .await
        .map_err(on_write)?
        .rows_affected();

        if updated == 0 {
            return Err(StoreError::not_found("product", product.id));
        }
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT * FROM products \
             WHERE ($1::boolean IS NULL OR is_active = $1) \
             ORDER BY id",
        )
        .bind(filter.is_active)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
        let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| classify(err, StoreError::Protected))?
            .rows_affected();
        Ok(deleted > 0)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn commit(&self, order: &OrderAggregate, events: &[OrderEvent]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for event in events {
            match event {
                OrderEvent::Created(e) => {
                    Self::write_header(&mut *tx, order).await?;
                    for line in &e.lines {
                        Self::write_item(&mut *tx, order.id, line).await?;
                    }
                }
                OrderEvent::Revised(e) => {
                    Self::write_header(&mut *tx, order).await?;
                    if let Some(lines) = &e.lines {
                        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
                            .bind(order.id)
                            .execute(&mut *tx)
                            .await?;
                        for line in lines {
                            Self::write_item(&mut *tx, order.id, line).await?;
                        }
                    }
                }
                OrderEvent::ItemSaved(e) => {
                    Self::write_item(&mut *tx, order.id, &e.line).await?;
                    Self::write_totals(&mut *tx, order).await?;
                }
                OrderEvent::StatusChanged(e) => {
                    let updated = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
                        .bind(order.id)
                        .bind(e.to.as_str())
                        .execute(&mut *tx)
                        .await?
                        .rows_affected();
                    if updated == 0 {
                        return Err(StoreError::not_found("order", order.id));
                    }
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<OrderAggregate>> {
        let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut items = self.load_items(&[id]).await?;
        row.into_aggregate(items.remove(&id).unwrap_or_default()).map(Some)
    }

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<OrderAggregate>> {
        let (from_day, to_day) = filter.created_between.unzip();

        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT o.*
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE ($1::text IS NULL OR o.status = $1)
              AND ($2::date IS NULL OR (o.created_at AT TIME ZONE 'UTC')::date = $2)
              AND ($3::timestamptz IS NULL OR o.created_at = $3)
              AND ($4::date IS NULL OR (o.created_at AT TIME ZONE 'UTC')::date >= $4)
              AND ($5::date IS NULL OR (o.created_at AT TIME ZONE 'UTC')::date <= $5)
              AND ($6::text IS NULL OR c.company_name = $6)
            ORDER BY o.created_at, o.id
            "#,
        )
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.created_on)
        .bind(filter.created_at)
        .bind(from_day)
        .bind(to_day)
        .bind(filter.customer_company_name.as_deref())
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut items = self.load_items(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                row.into_aggregate(lines)
            })
            .collect()
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        let deleted = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
