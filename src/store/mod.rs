// ============================================================================
// Store - Persistence Layer
// ============================================================================
//
// Traits the command handlers and the report generator program against,
// with two implementations:
// - PgStore       - PostgreSQL through sqlx (production)
// - InMemoryStore - lock-guarded maps (tests, local runs)
//
// Both honour the same rules: unique customer emails, protected products,
// cascading customer/order deletes, and the confirmed-status stock
// decrement applied atomically on every item write.
//
// ============================================================================

mod filters;
mod in_memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::customer::Customer;
use crate::domain::order::{OrderAggregate, OrderEvent};
use crate::domain::product::Product;

pub use filters::{CustomerFilter, OrderFilter, ProductFilter};
pub use in_memory::InMemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("row is still referenced: {0}")]
    Protected(String),

    #[error("referenced row does not exist: {0}")]
    MissingReference(String),

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        StoreError::NotFound { entity, id }
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()>;

    async fn update_customer(&self, customer: &Customer) -> StoreResult<()>;

    async fn get_customer(&self, id: Uuid) -> StoreResult<Option<Customer>>;

    async fn list_customers(&self, filter: &CustomerFilter) -> StoreResult<Vec<Customer>>;

    async fn customers_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Customer>>;

    /// Deletes the customer together with its orders and their items.
    /// Returns false when no such customer exists.
    async fn delete_customer(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_product(&self, product: &Product) -> StoreResult<()>;

    async fn update_product(&self, product: &Product) -> StoreResult<()>;

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>>;

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;

    /// Fails with [`StoreError::Protected`] while any order item
    /// references the product.
    async fn delete_product(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist the effect of `events` on `order` in one transaction.
    ///
    /// Header columns are written before item rows, and each item row
    /// write re-reads the order's stored status: when it is `confirmed`
    /// the product stock is decremented by the item quantity in the same
    /// statement-level atomic update.
    ///
    /// A single item save writes the item, then only `total` and
    /// `shipping_cost`; other header columns keep their stored values.
    async fn commit(&self, order: &OrderAggregate, events: &[OrderEvent]) -> StoreResult<()>;

    /// Load an order with its items and their current products.
    async fn get_order(&self, id: Uuid) -> StoreResult<Option<OrderAggregate>>;

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<OrderAggregate>>;

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait Store: CatalogStore + OrderStore {
    /// Cheap round trip used by the health monitor.
    async fn ping(&self) -> StoreResult<()>;
}
