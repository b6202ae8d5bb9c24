use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::domain::DomainError;
use crate::report::ReportError;
use crate::store::StoreError;

// ============================================================================
// API Error - HTTP boundary for every failure
// ============================================================================
//
// Bodies are always `{"detail": "..."}`. Internal causes are logged when
// the error is built and replaced by a generic message on the wire.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication credentials were not provided.")]
    Unauthenticated,

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("A server error occurred.")]
    Internal,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn required(field: &str) -> Self {
        ApiError::Validation(format!("{field}: This field is required."))
    }

    fn internal(cause: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "Request failed");
        ApiError::Internal
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            e if e.is_validation() => ApiError::Validation(e.to_string()),
            e => ApiError::internal(&e),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            e => ApiError::internal(&e),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::MissingRange | ReportError::InvalidDate(_) => ApiError::Validation(err.to_string()),
            e => ApiError::internal(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderError;
    use actix_web::body::to_bytes;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        let validation: ApiError = DomainError::from(OrderError::InvalidQuantity(-1)).into();
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);

        let missing: ApiError = DomainError::not_found("order", Uuid::nil()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let internal: ApiError = DomainError::from(StoreError::Poisoned).into();
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let report: ApiError = ReportError::MissingRange.into();
        assert_eq!(report.status_code(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_internal_details_are_not_leaked() {
        let err: ApiError = StoreError::Corrupt("order 1 has status \"x\"".to_string()).into();
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"detail": "A server error occurred."}));
    }

    #[actix_web::test]
    async fn test_missing_range_detail() {
        let err: ApiError = ReportError::MissingRange.into();
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "start and end required");
    }
}
