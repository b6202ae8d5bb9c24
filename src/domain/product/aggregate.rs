use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::commands::{NewProduct, ProductChanges};
use super::errors::ProductError;

// ============================================================================
// Product - Catalog Record
// ============================================================================

pub const MAX_NAME_LEN: usize = 255;

/// NUMERIC(12, 2): ten integer digits, two fractional.
const MAX_PRICE_SCALE: u32 = 2;
const PRICE_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0); // 10^10

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub is_active: bool,
}

impl Product {
    pub fn create(command: NewProduct) -> Result<Self, ProductError> {
        if let Some(stock) = command.stock_quantity {
            check_stock_input(stock)?;
        }
        let product = Self {
            id: Uuid::now_v7(),
            name: command.name,
            description: command.description,
            price: command.price.unwrap_or(Decimal::ZERO),
            stock_quantity: command.stock_quantity.unwrap_or(0),
            is_active: command.is_active.unwrap_or(true),
        };
        product.validate()?;
        Ok(product)
    }

    /// Apply an edit, leaving `self` untouched when the result is invalid.
    pub fn apply_changes(&mut self, changes: ProductChanges) -> Result<(), ProductError> {
        let mut next = self.clone();
        if let Some(name) = changes.name {
            next.name = name;
        }
        if let Some(description) = changes.description {
            next.description = description;
        }
        if let Some(price) = changes.price {
            next.price = price;
        }
        if let Some(stock_quantity) = changes.stock_quantity {
            check_stock_input(stock_quantity)?;
            next.stock_quantity = stock_quantity;
        }
        if let Some(is_active) = changes.is_active {
            next.is_active = is_active;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }
        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(ProductError::NameTooLong { max: MAX_NAME_LEN });
        }
        if self.price < Decimal::ZERO {
            return Err(ProductError::NegativePrice(self.price));
        }
        if self.price.normalize().scale() > MAX_PRICE_SCALE || self.price >= PRICE_LIMIT {
            return Err(ProductError::PriceOutOfRange(self.price));
        }
        Ok(())
    }
}

/// Stock input must be non-negative; the stored value may still drop
/// below zero through confirmed-order decrements.
fn check_stock_input(stock_quantity: i32) -> Result<(), ProductError> {
    if stock_quantity < 0 {
        return Err(ProductError::NegativeStock(stock_quantity));
    }
    Ok(())
}
