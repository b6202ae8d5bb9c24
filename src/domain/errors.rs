use uuid::Uuid;

use crate::store::StoreError;
use super::customer::CustomerError;
use super::order::OrderError;
use super::product::ProductError;

// ============================================================================
// Domain Error - what command handlers return
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Customer(#[from] CustomerError),

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        DomainError::NotFound { entity, id }
    }

    /// Whether the failure was caused by caller input rather than the
    /// service itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::Order(_) | DomainError::Customer(_) | DomainError::Product(_)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
