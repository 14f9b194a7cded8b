// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for Ward.
//!
//! Every fallible operation in the core returns [`WardError`]. The variants
//! follow the access-control taxonomy used by the API layer:
//!
//! ```text
//! WardError
//! ├── Validation      - missing or malformed input
//! ├── Authentication  - missing, invalid, expired or revoked credential
//! ├── Authorization   - valid credential, insufficient scope
//! ├── NotFound        - referenced entity absent
//! ├── Consistency     - cross-entity invariant violated
//! ├── CascadeFailure  - a dependent deletion branch failed
//! └── Store           - the backing store failed
//! ```
//!
//! # Examples
//!
//! ```
//! use ward_core::error::WardError;
//!
//! let err = WardError::not_found("user", "64f0c2a1b3d4e5f6a7b8c9d0");
//! assert_eq!(err.error_type(), "not_found");
//! assert!(!err.is_retryable());
//! ```

use thiserror::Error;

/// Result type alias for core operations.
pub type WardResult<T> = Result<T, WardError>;

// =============================================================================
// WardError
// =============================================================================

/// The root error type for Ward.
#[derive(Debug, Error)]
pub enum WardError {
    /// A required field is missing or malformed.
    #[error("{message}")]
    Validation {
        /// Error message, surfaced to the caller verbatim.
        message: String,
    },

    /// The credential is missing, invalid, expired or revoked.
    #[error("{message}")]
    Authentication {
        /// Error message.
        message: String,
    },

    /// The credential is valid but does not cover the request.
    #[error("{message}")]
    Authorization {
        /// Error message.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `user`.
        entity: &'static str,
        /// The identifier or filter that matched nothing.
        id: String,
    },

    /// A cross-entity invariant would be violated.
    #[error("{message}")]
    Consistency {
        /// Error message.
        message: String,
    },

    /// One or more concurrent dependent deletions failed.
    #[error("cascade step '{step}' failed: {source}")]
    CascadeFailure {
        /// Name of the first failing step.
        step: &'static str,
        /// Steps that completed before the error was surfaced.
        completed: Vec<&'static str>,
        /// The underlying error.
        #[source]
        source: Box<WardError>,
    },

    /// The backing store reported an error.
    #[error("store error: {message}")]
    Store {
        /// Error message.
        message: String,
        /// Whether the failure is transient.
        retryable: bool,
    },
}

impl WardError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a validation error listing missing fields.
    pub fn missing_fields(entity: &str, fields: &[&str]) -> Self {
        Self::validation(format!(
            "missing the following {} fields: {}",
            entity,
            fields.join(", ")
        ))
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a consistency error.
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::Consistency {
            message: message.into(),
        }
    }

    /// Creates a non-retryable store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates a transient store error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            retryable: true,
        }
    }

    /// Wraps an error raised by a cascade step.
    pub fn cascade(step: &'static str, completed: Vec<&'static str>, source: WardError) -> Self {
        Self::CascadeFailure {
            step,
            completed,
            source: Box::new(source),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns `true` if retrying the same call may succeed.
    ///
    /// A failed cascade is retryable as a whole because deleting an
    /// already-deleted record counts as success.
    pub fn is_retryable(&self) -> bool {
        match self {
            WardError::Store { retryable, .. } => *retryable,
            WardError::CascadeFailure { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Returns the error type as a stable string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            WardError::Validation { .. } => "validation",
            WardError::Authentication { .. } => "authentication",
            WardError::Authorization { .. } => "authorization",
            WardError::NotFound { .. } => "not_found",
            WardError::Consistency { .. } => "consistency",
            WardError::CascadeFailure { .. } => "cascade_failure",
            WardError::Store { .. } => "store",
        }
    }

    /// Returns `true` for errors caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            WardError::CascadeFailure { .. } | WardError::Store { .. }
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
