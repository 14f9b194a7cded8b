// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use ward_core::{CascadeReport, User};

// =============================================================================
// ApiResponse
// =============================================================================

/// Generic API response wrapper.
///
/// Provides consistent response structure across all endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful.
    pub success: bool,
    /// Response data (if successful).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Additional metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful response with data.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            meta: None,
        }
    }

    /// Adds metadata to the response.
    pub fn with_meta(mut self, meta: ResponseMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Creates a list response carrying the item count.
    pub fn list(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self::success(items).with_meta(ResponseMeta::total(total))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

// =============================================================================
// Response Meta
// =============================================================================

/// Response metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Total number of items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl ResponseMeta {
    pub fn total(total: u64) -> Self {
        Self { total: Some(total) }
    }
}

// =============================================================================
// Typed Responses
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// A freshly issued credential.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed token.
    pub token: String,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// Seconds until expiry.
    pub expires_in: u64,
}

impl TokenResponse {
    pub fn new(token: String, expires_in: u64) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// A signed-in user together with their session token.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    #[serde(flatten)]
    pub token: TokenResponse,
}

/// Outcome of a cascading delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Id of the deleted record.
    pub id: String,
    /// Dependent records removed, per branch.
    pub removed: Vec<RemovedCount>,
}

/// Records removed by one cascade branch.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemovedCount {
    pub step: String,
    pub count: u64,
}

impl DeleteResponse {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            removed: Vec::new(),
        }
    }

    /// Builds a response from a completed cascade.
    pub fn from_report(id: impl Into<String>, report: &CascadeReport) -> Self {
        let removed = report
            .steps()
            .iter()
            .filter_map(|outcome| {
                outcome.result.as_ref().ok().map(|count| RemovedCount {
                    step: outcome.step.as_str().to_string(),
                    count: *count,
                })
            })
            .collect();
        Self {
            id: id.into(),
            removed,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
