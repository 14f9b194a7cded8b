// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use ward_core::GroupStore;

use crate::response::HealthResponse;
use crate::state::AppState;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Simple liveness check. Returns 200 OK if the service is running.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

// =============================================================================
// Readiness Check
// =============================================================================

/// Readiness check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service is ready.
    pub ready: bool,
    /// Number of stored groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<u64>,
    /// Store error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /ready
///
/// Readiness check that the group store answers.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.stores().groups.count().await {
        Ok(count) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                ready: true,
                groups: Some(count),
                message: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    ready: false,
                    groups: None,
                    message: Some(e.to_string()),
                }),
            )
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
