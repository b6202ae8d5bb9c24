use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::store::{Store, StoreError};

use super::aggregate::Customer;
use super::commands::{CustomerChanges, NewCustomer};
use super::errors::CustomerError;

// ============================================================================
// Customer Command Handler
// ============================================================================
//
// Orchestrates: Command → Customer validation → Store
//
// ============================================================================

pub struct CustomerCommandHandler {
    store: Arc<dyn Store>,
}

impl CustomerCommandHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn register(&self, command: NewCustomer) -> DomainResult<Customer> {
        let customer = Customer::register(command)?;
        self.store
            .insert_customer(&customer)
            .await
            .map_err(|e| email_conflict(e, &customer))?;

        info!(customer_id = %customer.id, email = %customer.email.as_str(), "Customer registered");
        Ok(customer)
    }

    pub async fn update(&self, id: Uuid, changes: CustomerChanges) -> DomainResult<Customer> {
        let mut customer = self
            .store
            .get_customer(id)
            .await?
            .ok_or_else(|| DomainError::not_found("customer", id))?;

        customer.apply_changes(changes)?;
        self.store
            .update_customer(&customer)
            .await
            .map_err(|e| email_conflict(e, &customer))?;

        info!(customer_id = %id, "Customer updated");
        Ok(customer)
    }

    /// Removes the customer with all of its orders. Stock is not restored.
    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        if !self.store.delete_customer(id).await? {
            return Err(DomainError::not_found("customer", id));
        }
        info!(customer_id = %id, "Customer deleted with its orders");
        Ok(())
    }
}

fn email_conflict(err: StoreError, customer: &Customer) -> DomainError {
    match err {
        StoreError::Conflict(_) => CustomerError::EmailTaken(customer.email.as_str().to_string()).into(),
        StoreError::NotFound { entity, id } => DomainError::not_found(entity, id),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn handler() -> CustomerCommandHandler {
        CustomerCommandHandler::new(Arc::new(InMemoryStore::new()))
    }

    fn new_customer(email: &str) -> NewCustomer {
        NewCustomer {
            email: email.to_string(),
            company_name: Some("Acme".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_validation_error() {
        let handler = handler();
        handler.register(new_customer("a@example.com")).await.unwrap();

        let err = handler.register(new_customer("a@example.com")).await.unwrap_err();

        assert!(matches!(err, DomainError::Customer(CustomerError::EmailTaken(_))));
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_update_to_taken_email_is_rejected() {
        let handler = handler();
        handler.register(new_customer("a@example.com")).await.unwrap();
        let other = handler.register(new_customer("b@example.com")).await.unwrap();

        let err = handler
            .update(
                other.id,
                CustomerChanges {
                    email: Some("a@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Customer(CustomerError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn test_update_clears_optional_fields() {
        let handler = handler();
        let customer = handler.register(new_customer("a@example.com")).await.unwrap();

        let updated = handler
            .update(
                customer.id,
                CustomerChanges {
                    company_name: Some(None),
                    full_name: Some(Some("Ada".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.company_name.is_none());
        assert_eq!(updated.full_name.as_deref(), Some("Ada"));
        assert_eq!(updated.created_at, customer.created_at);
    }

    #[tokio::test]
    async fn test_missing_customer() {
        let handler = handler();
        let id = Uuid::now_v7();

        assert!(matches!(
            handler.update(id, CustomerChanges::default()).await.unwrap_err(),
            DomainError::NotFound { entity: "customer", .. }
        ));
        assert!(matches!(
            handler.delete(id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }
}
