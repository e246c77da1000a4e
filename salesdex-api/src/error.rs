//! Error Types for the Salesdex API
//!
//! Every failure leaves the API as a JSON body `{code, message}` with the
//! status its code maps to. Library errors are converted here and nowhere
//! else.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use salesdex_core::{QueryError, SalesdexError, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A query parameter was rejected
    InvalidParameter,

    /// The query matched nothing
    EmptyResult,

    /// Datasets are not loaded yet
    NotLoaded,

    /// Anything else
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidParameter => StatusCode::BAD_REQUEST,
            ErrorCode::EmptyResult => StatusCode::NOT_FOUND,
            ErrorCode::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParameter => "Invalid query parameter",
            ErrorCode::EmptyResult => "No matching sales",
            ErrorCode::NotLoaded => "Sales data not loaded",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create an error with the default message of `code`.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParameter, message)
    }

    pub fn not_loaded() -> Self {
        Self::from_code(ErrorCode::NotLoaded)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM LIBRARY ERRORS
// ============================================================================

impl From<SalesdexError> for ApiError {
    fn from(err: SalesdexError) -> Self {
        match &err {
            SalesdexError::Query(QueryError::EmptyResult { .. }) => {
                ApiError::new(ErrorCode::EmptyResult, err.to_string())
            }
            SalesdexError::Query(QueryError::InvalidParameter { .. }) => {
                ApiError::invalid_parameter(err.to_string())
            }
            SalesdexError::Store(StoreError::NotLoaded) => ApiError::not_loaded(),
            _ => {
                // Load failures carry file paths; keep them in the log only.
                tracing::error!(error = %err, "Query failed");
                ApiError::from_code(ErrorCode::InternalError)
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!("Blocking task failed: {:?}", err);
        ApiError::from_code(ErrorCode::InternalError)
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use salesdex_core::{DatasetKind, LoadError, RecordPosition};

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::InvalidParameter.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::EmptyResult.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::NotLoaded.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ErrorCode::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_library_errors_map_to_codes() {
        let empty = ApiError::from(SalesdexError::from(QueryError::EmptyResult {
            operation: "top_products_by_country".to_string(),
            key: "Narnia".to_string(),
        }));
        assert_eq!(empty.code, ErrorCode::EmptyResult);
        assert!(empty.message.contains("Narnia"));

        let invalid = ApiError::from(SalesdexError::from(QueryError::InvalidParameter {
            name: "limit".to_string(),
            value: "0".to_string(),
            reason: "limit must be between 1 and 100".to_string(),
        }));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let not_loaded = ApiError::from(SalesdexError::from(StoreError::NotLoaded));
        assert_eq!(not_loaded.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let malformed = ApiError::from(SalesdexError::from(LoadError::DatasetMalformed {
            dataset: DatasetKind::Sales,
            position: RecordPosition::at_index(3),
            reason: "missing field `id`".to_string(),
        }));
        assert_eq!(malformed.code, ErrorCode::InternalError);
        assert_eq!(malformed.message, "Internal server error");
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::invalid_parameter("limit must be between 1 and 100");
        let json = serde_json::to_value(&err)?;
        assert_eq!(json["code"], "INVALID_PARAMETER");
        assert_eq!(json["message"], "limit must be between 1 and 100");
        Ok(())
    }
}
