use rust_decimal::Decimal;
use uuid::Uuid;

use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("\"{0}\" is not a valid order status")]
    UnknownStatus(String),

    #[error("Order cannot move from {from} to {to}")]
    TransitionNotAllowed { from: OrderStatus, to: OrderStatus },

    #[error("Product {0} appears more than once in the order")]
    DuplicateProduct(Uuid),

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("{field} must have at most 2 decimal places and be below 100: {value}")]
    InvalidPercent { field: &'static str, value: Decimal },

    #[error("Customer {0} does not exist")]
    UnknownCustomer(Uuid),

    #[error("Product {0} does not exist")]
    UnknownProduct(Uuid),

    #[error("Aggregate not initialized")]
    NotInitialized,
}
