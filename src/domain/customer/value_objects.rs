use serde::{Deserialize, Serialize};

use super::errors::CustomerError;

// ============================================================================
// Customer Value Objects
// ============================================================================

pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_PHONE_LEN: usize = 50;

/// Customer email address, unique across the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn parse(email: impl Into<String>) -> Result<Self, CustomerError> {
        let email = email.into().trim().to_string();
        if email.is_empty() {
            return Err(CustomerError::EmptyEmail);
        }
        if email.chars().count() > MAX_EMAIL_LEN {
            return Err(CustomerError::InvalidEmail(email));
        }
        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(email))
            }
            _ => Err(CustomerError::InvalidEmail(email)),
        }
    }

    /// Rebuild from a value the store already accepted.
    pub(crate) fn from_stored(email: String) -> Self {
        Self(email)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Customer phone number, free-form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(phone: impl Into<String>) -> Result<Self, CustomerError> {
        let phone = phone.into();
        if phone.chars().count() > MAX_PHONE_LEN {
            return Err(CustomerError::FieldTooLong {
                field: "phone",
                max: MAX_PHONE_LEN,
            });
        }
        Ok(Self(phone))
    }

    pub(crate) fn from_stored(phone: String) -> Self {
        Self(phone)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_accepts_plain_address() {
        let email = Email::parse("ivan@example.com").unwrap();
        assert_eq!(email.as_str(), "ivan@example.com");
    }

    #[test]
    fn test_email_is_trimmed() {
        let email = Email::parse("  ivan@example.com ").unwrap();
        assert_eq!(email.as_str(), "ivan@example.com");
    }

    #[test]
    fn test_email_rejects_empty() {
        assert!(matches!(Email::parse("").unwrap_err(), CustomerError::EmptyEmail));
    }

    #[test]
    fn test_email_rejects_malformed() {
        for bad in ["no-at-sign", "@example.com", "ivan@", "a@b@c"] {
            assert!(
                matches!(Email::parse(bad).unwrap_err(), CustomerError::InvalidEmail(_)),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_email_serializes_as_plain_string() {
        let email = Email::parse("ivan@example.com").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"ivan@example.com\"");
    }

    #[test]
    fn test_phone_length_limit() {
        assert!(PhoneNumber::parse("+7 900 000-00-00").is_ok());
        assert!(PhoneNumber::parse("9".repeat(51)).is_err());
    }
}
