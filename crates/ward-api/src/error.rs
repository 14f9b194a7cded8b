// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! [`ApiError`] maps the core error taxonomy to HTTP status codes and JSON
//! error bodies. Messages are returned to the caller verbatim.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ward_core::WardError;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404).
    #[error("{resource} not found")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Malformed request (400).
    #[error("{message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Missing, invalid, expired or revoked credential (401).
    #[error("{message}")]
    Unauthenticated {
        /// Error message.
        message: String,
    },

    /// Valid credential, insufficient scope (403).
    #[error("{message}")]
    PermissionDenied {
        /// Error message.
        message: String,
    },

    /// Missing or malformed field (422).
    #[error("{message}")]
    Validation {
        /// Error message.
        message: String,
    },

    /// Cross-entity invariant violated (409).
    #[error("{message}")]
    Conflict {
        /// Error message.
        message: String,
    },

    /// Backing store temporarily unavailable (503).
    #[error("service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Creates a permission denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Unauthenticated { .. } => "UNAUTHENTICATED",
            ApiError::PermissionDenied { .. } => "PERMISSION_DENIED",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ApiError::Internal { .. } | ApiError::ServiceUnavailable { .. }
        )
    }

    /// Returns `true` for access-control denials.
    pub fn is_access_denial(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthenticated { .. } | ApiError::PermissionDenied { .. }
        )
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<WardError> for ApiError {
    fn from(err: WardError) -> Self {
        match err {
            WardError::Validation { message } => ApiError::validation(message),
            WardError::Authentication { message } => ApiError::unauthenticated(message),
            WardError::Authorization { message } => ApiError::permission_denied(message),
            WardError::NotFound { entity, id } => ApiError::not_found(format!("{} {}", entity, id)),
            WardError::Consistency { message } => ApiError::conflict(message),
            err @ WardError::CascadeFailure { .. } => ApiError::internal(err.to_string()),
            WardError::Store {
                message,
                retryable: true,
            } => ApiError::ServiceUnavailable { message },
            WardError::Store { message, .. } => ApiError::internal(message),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", err))
    }
}

// =============================================================================
// Tests
// =============================================================================
