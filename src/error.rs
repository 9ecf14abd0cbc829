// HTTP API Error Types
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::database::manager::DatabaseError;
use crate::database::patch::PatchError;
use crate::validation::FieldErrors;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed,

    // 422 Unprocessable Entity with a field -> message map
    Validation {
        message: String,
        details: FieldErrors,
    },

    // 422 Unprocessable Entity without field details
    Unprocessable(String),

    // 423 Locked
    Locked(String),

    // 429 Too Many Requests
    TooManyRequests {
        message: String,
        retry_after: u64,
    },

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed => 405,
            ApiError::Validation { .. } => 422,
            ApiError::Unprocessable(_) => 422,
            ApiError::Locked(_) => 423,
            ApiError::TooManyRequests { .. } => 429,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::Validation { message, .. } => message,
            ApiError::Unprocessable(msg) => msg,
            ApiError::Locked(msg) => msg,
            ApiError::TooManyRequests { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Unprocessable(_) => "UNPROCESSABLE_ENTITY",
            ApiError::Locked(_) => "LOCKED",
            ApiError::TooManyRequests { .. } => "TOO_MANY_REQUESTS",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation { message, details } => json!({
                "error": message,
                "code": self.error_code(),
                "details": details,
            }),
            _ => json!({
                "error": self.message(),
                "code": self.error_code(),
            }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn validation(details: FieldErrors) -> Self {
        ApiError::Validation {
            message: "Validation failed".to_string(),
            details,
        }
    }

    /// Single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut details = FieldErrors::new();
        details.insert(field.to_string(), message.into());
        Self::validation(details)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        ApiError::Unprocessable(message.into())
    }

    pub fn locked(message: impl Into<String>) -> Self {
        ApiError::Locked(message.into())
    }

    pub fn too_many_requests(retry_after: u64) -> Self {
        ApiError::TooManyRequests {
            message: "Rate limit exceeded.".to_string(),
            retry_after,
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

/// numeric_value_out_of_range, string_data_right_truncation
const DATA_OUT_OF_RANGE: &[&str] = &["22003", "22001"];

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Sqlx(sqlx_err) => {
                if let Some(db_err) = sqlx_err.as_database_error() {
                    match db_err.code().as_deref() {
                        Some("23505") => {
                            tracing::warn!("Unique constraint violation: {}", db_err.message());
                            return ApiError::unprocessable("Duplicate value");
                        }
                        Some("23503") => {
                            tracing::warn!("Foreign key violation: {}", db_err.message());
                            return ApiError::unprocessable("Referenced record does not exist");
                        }
                        Some(code) if DATA_OUT_OF_RANGE.contains(&code) => {
                            tracing::warn!("Value rejected by column type: {}", db_err.message());
                            return ApiError::unprocessable("Value out of range");
                        }
                        _ => {}
                    }
                }
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Internal server error")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        DatabaseError::Sqlx(err).into()
    }
}

impl From<PatchError> for ApiError {
    fn from(err: PatchError) -> Self {
        match err {
            PatchError::NoFieldsToUpdate => ApiError::unprocessable("No fields to update"),
            PatchError::InvalidValue { field, expected } => {
                ApiError::invalid_field(&field, format!("Expected {}", expected))
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.to_json())).into_response();
        if let ApiError::TooManyRequests { retry_after, .. } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_carries_details() {
        let err = ApiError::invalid_field("email", "Invalid email");
        let body = err.to_json();
        assert_eq!(err.status_code(), 422);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"]["email"], "Invalid email");
    }

    #[test]
    fn plain_errors_have_no_details() {
        let body = ApiError::locked("Account locked. Try later.").to_json();
        assert_eq!(body["error"], "Account locked. Try later.");
        assert_eq!(body["code"], "LOCKED");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn rate_limit_response_sets_retry_after() {
        let response = ApiError::too_many_requests(42).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[test]
    fn patch_errors_map_to_unprocessable() {
        let err: ApiError = PatchError::NoFieldsToUpdate.into();
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.message(), "No fields to update");
    }
}
