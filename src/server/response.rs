use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{Error, Result as CrateResult};
use crate::services::{HpcError, UpstreamReply};
use crate::types::Denial;

/// Envelope returned by every endpoint: `{code, error_msg, result}`.
/// The HTTP status always equals `code`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub error_msg: String,
    pub result: T,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(result: T) -> Self {
        Self::with_status(StatusCode::OK, result)
    }

    #[must_use]
    pub fn with_status(status: StatusCode, result: T) -> Self {
        Self {
            code: status.as_u16(),
            error_msg: String::new(),
            result,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// API error that converts to an envelope response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub result: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            result: json!({}),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[must_use]
    pub fn with_result(mut self, result: impl Into<Value>) -> Self {
        self.result = result.into();
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "code": self.status.as_u16(),
            "error_msg": self.message,
            "result": self.result,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        Self {
            status: denial.code,
            message: denial.error_msg,
            result: denial.result,
        }
    }
}

impl From<HpcError> for ApiError {
    fn from(error: HpcError) -> Self {
        Self::new(error.code, error.message)
    }
}

/// Mirrors a downstream reply: same status, same body.
pub struct Passthrough(pub UpstreamReply);

impl IntoResponse for Passthrough {
    fn into_response(self) -> Response {
        (self.0.status, Json(self.0.body)).into_response()
    }
}

/// Extension trait for converting crate results to API errors.
pub trait StoreResultExt<T> {
    /// Maps any error to a 500 whose message is `context: error`.
    fn api_err(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for CrateResult<T> {
    fn api_err(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e: Error| {
            tracing::warn!("{context}: {e}");
            ApiError::internal(format!("{context}: {e}"))
        })
    }
}

/// Extension for Option types from store operations.
pub trait StoreOptionExt<T> {
    fn or_not_found(self, message: impl Into<String>) -> Result<T, ApiError>;
}

impl<T> StoreOptionExt<T> for Option<T> {
    fn or_not_found(self, message: impl Into<String>) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}
