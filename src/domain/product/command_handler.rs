use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::store::{Store, StoreError};

use super::aggregate::Product;
use super::commands::{NewProduct, ProductChanges};
use super::errors::ProductError;

// ============================================================================
// Product Command Handler
// ============================================================================

pub struct ProductCommandHandler {
    store: Arc<dyn Store>,
}

impl ProductCommandHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, command: NewProduct) -> DomainResult<Product> {
        let product = Product::create(command)?;
        self.store.insert_product(&product).await?;

        info!(product_id = %product.id, price = %product.price, "Product created");
        Ok(product)
    }

    pub async fn update(&self, id: Uuid, changes: ProductChanges) -> DomainResult<Product> {
        let mut product = self
            .store
            .get_product(id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", id))?;

        product.apply_changes(changes)?;
        self.store.update_product(&product).await?;

        info!(product_id = %id, stock_quantity = product.stock_quantity, "Product updated");
        Ok(product)
    }

    /// Rejected while any order item references the product.
    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        match self.store.delete_product(id).await {
            Ok(true) => {
                info!(product_id = %id, "Product deleted");
                Ok(())
            }
            Ok(false) => Err(DomainError::not_found("product", id)),
            Err(StoreError::Protected(_)) => Err(ProductError::InUse(id).into()),
            Err(e) => Err(e.into()),
        }
    }
}
