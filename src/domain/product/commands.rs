use rust_decimal::Decimal;

// ============================================================================
// Product Commands
// ============================================================================

/// Input for creating a product. Omitted fields take the catalog defaults.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub is_active: Option<bool>,
}

/// Field-level edit. `None` leaves a field untouched; for `description`,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub is_active: Option<bool>,
}
