// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `authService.AuthService` handlers.

use axum::extract::State;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::extractors::{Auth, ValidatedJson};
use crate::response::{ApiResponse, SessionResponse, TokenResponse};
use crate::service::auth::{LoginRequest, RegisterRequest, UpdatePasswordRequest};
use crate::state::AppState;

/// POST /authService.AuthService/Register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<ApiResponse<SessionResponse>> {
    Ok(ApiResponse::success(state.auth().register(req).await?))
}

/// POST /authService.AuthService/Login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<ApiResponse<SessionResponse>> {
    Ok(ApiResponse::success(state.auth().login(req).await?))
}

/// POST /authService.AuthService/Logout
///
/// Revokes the presented token.
pub async fn logout(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<ApiResponse<Value>> {
    state.auth().logout(&ctx).await?;
    Ok(ApiResponse::success(json!({ "message": "logged out" })))
}

/// POST /authService.AuthService/Refresh
pub async fn refresh(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<ApiResponse<TokenResponse>> {
    Ok(ApiResponse::success(state.auth().refresh(&ctx).await?))
}

/// POST /authService.AuthService/GenerateKey
pub async fn generate_key(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<ApiResponse<TokenResponse>> {
    Ok(ApiResponse::success(state.auth().generate_key(&ctx).await?))
}

/// POST /authService.AuthService/UpdatePassword
pub async fn update_password(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<UpdatePasswordRequest>,
) -> ApiResult<ApiResponse<Value>> {
    state.auth().update_password(&ctx, req).await?;
    Ok(ApiResponse::success(json!({ "message": "password updated" })))
}
