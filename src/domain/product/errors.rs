use rust_decimal::Decimal;
use uuid::Uuid;

// ============================================================================
// Product Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product name cannot be empty")]
    EmptyName,

    #[error("Product name is longer than {max} characters")]
    NameTooLong { max: usize },

    #[error("Price cannot be negative: {0}")]
    NegativePrice(Decimal),

    #[error("Price must have at most 2 decimal places and 10 integer digits: {0}")]
    PriceOutOfRange(Decimal),

    #[error("Stock quantity cannot be negative: {0}")]
    NegativeStock(i32),

    #[error("Product {0} is referenced by order items and cannot be deleted")]
    InUse(Uuid),
}
