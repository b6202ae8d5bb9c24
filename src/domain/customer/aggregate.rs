use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::commands::{CustomerChanges, NewCustomer};
use super::errors::CustomerError;
use super::value_objects::{Email, PhoneNumber};

// ============================================================================
// Customer - Catalog Record
// ============================================================================

pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Email,
    pub company_name: Option<String>,
    pub phone: Option<PhoneNumber>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn register(command: NewCustomer) -> Result<Self, CustomerError> {
        Ok(Self {
            id: Uuid::now_v7(),
            full_name: checked_name("full_name", command.full_name)?,
            email: Email::parse(command.email)?,
            company_name: checked_name("company_name", command.company_name)?,
            phone: command.phone.map(PhoneNumber::parse).transpose()?,
            created_at: Utc::now(),
        })
    }

    /// Apply an edit, leaving `self` untouched when any field is invalid.
    pub fn apply_changes(&mut self, changes: CustomerChanges) -> Result<(), CustomerError> {
        let mut next = self.clone();
        if let Some(full_name) = changes.full_name {
            next.full_name = checked_name("full_name", full_name)?;
        }
        if let Some(email) = changes.email {
            next.email = Email::parse(email)?;
        }
        if let Some(company_name) = changes.company_name {
            next.company_name = checked_name("company_name", company_name)?;
        }
        if let Some(phone) = changes.phone {
            next.phone = phone.map(PhoneNumber::parse).transpose()?;
        }
        *self = next;
        Ok(())
    }
}

fn checked_name(field: &'static str, value: Option<String>) -> Result<Option<String>, CustomerError> {
    match value {
        Some(v) if v.chars().count() > MAX_NAME_LEN => Err(CustomerError::FieldTooLong {
            field,
            max: MAX_NAME_LEN,
        }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_customer() -> NewCustomer {
        NewCustomer {
            full_name: Some("Ivan Petrov".to_string()),
            email: "ivan@example.com".to_string(),
            company_name: Some("Acme".to_string()),
            phone: None,
        }
    }

    #[test]
    fn test_register_customer() {
        let customer = Customer::register(new_customer()).unwrap();

        assert_eq!(customer.email.as_str(), "ivan@example.com");
        assert_eq!(customer.company_name.as_deref(), Some("Acme"));
        assert!(customer.phone.is_none());
    }

    #[test]
    fn test_register_requires_valid_email() {
        let result = Customer::register(NewCustomer {
            email: "not-an-email".to_string(),
            ..new_customer()
        });
        assert!(matches!(result.unwrap_err(), CustomerError::InvalidEmail(_)));
    }

    #[test]
    fn test_register_rejects_long_company_name() {
        let result = Customer::register(NewCustomer {
            company_name: Some("x".repeat(256)),
            ..new_customer()
        });
        assert!(matches!(
            result.unwrap_err(),
            CustomerError::FieldTooLong { field: "company_name", .. }
        ));
    }

    #[test]
    fn test_apply_changes_keeps_identity() {
        let mut customer = Customer::register(new_customer()).unwrap();
        let id = customer.id;
        let created_at = customer.created_at;

        customer
            .apply_changes(CustomerChanges {
                email: Some("petrov@example.com".to_string()),
                company_name: Some(None),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(customer.id, id);
        assert_eq!(customer.created_at, created_at);
        assert_eq!(customer.email.as_str(), "petrov@example.com");
        assert!(customer.company_name.is_none());
        assert_eq!(customer.full_name.as_deref(), Some("Ivan Petrov"));
    }

    #[test]
    fn test_invalid_change_leaves_customer_untouched() {
        let mut customer = Customer::register(new_customer()).unwrap();
        let before = customer.clone();

        let result = customer.apply_changes(CustomerChanges {
            full_name: Some(Some("New Name".to_string())),
            email: Some(String::new()),
            ..Default::default()
        });

        assert!(result.is_err());
        assert_eq!(customer, before);
    }
}
