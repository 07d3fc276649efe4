// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for the gateway

use actix_web::{
    error::{JsonPayloadError, QueryPayloadError, ResponseError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};
use serde_json::json;
use thiserror::Error;

/// Gateway error types
/// DOCUMENTATION: Every variant maps to one HTTP status and a stable error code
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl GatewayError {
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::NotFound(_) => "NOT_FOUND",
            GatewayError::InvalidInput(_) => "INVALID_INPUT",
            GatewayError::ValidationError(_) => "VALIDATION_ERROR",
            GatewayError::Unauthorized => "UNAUTHORIZED",
            GatewayError::Forbidden(_) => "FORBIDDEN",
            GatewayError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            GatewayError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            GatewayError::InternalError(_) => "INTERNAL_ERROR",
            GatewayError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            GatewayError::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
        }
    }
}

/// Convert GatewayError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and the JSON error envelope
impl ResponseError for GatewayError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::ValidationError(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            GatewayError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<validator::ValidationErrors> for GatewayError {
    fn from(errors: validator::ValidationErrors) -> Self {
        GatewayError::ValidationError(errors.to_string())
    }
}

/// Error handler for `web::JsonConfig`
/// Keeps extractor failures inside the JSON error envelope
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let mapped = match err {
        JsonPayloadError::Overflow { limit } => GatewayError::PayloadTooLarge(limit),
        JsonPayloadError::OverflowKnownLength { limit, .. } => GatewayError::PayloadTooLarge(limit),
        other => GatewayError::InvalidInput(other.to_string()),
    };
    mapped.into()
}

/// Error handler for `web::QueryConfig`
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    GatewayError::InvalidInput(err.to_string()).into()
}
