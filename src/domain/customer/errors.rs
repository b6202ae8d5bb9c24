// ============================================================================
// Customer Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("A customer with email {0} already exists")]
    EmailTaken(String),

    #[error("{field} is longer than {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
}
