// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `usersService.UserService` handlers.

use axum::extract::State;
use ward_core::{GroupId, User, UserId};

use super::{ByGroupRequest, ByIdRequest};
use crate::error::ApiResult;
use crate::extractors::{Auth, ValidatedJson};
use crate::response::{ApiResponse, DeleteResponse};
use crate::service::users::{CreateUserRequest, FindUsersRequest, GroupUsers, UpdateUserRequest};
use crate::state::AppState;

/// POST /usersService.UserService/Create
pub async fn create_user(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<ApiResponse<User>> {
    Ok(ApiResponse::success(state.users().create(ctx.claims(), req).await?))
}

/// POST /usersService.UserService/Update
pub async fn update_user(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<ApiResponse<User>> {
    Ok(ApiResponse::success(state.users().update(ctx.claims(), req).await?))
}

/// POST /usersService.UserService/Get
pub async fn get_user(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<ByIdRequest<UserId>>,
) -> ApiResult<ApiResponse<User>> {
    Ok(ApiResponse::success(state.users().get(ctx.claims(), &req.id).await?))
}

/// POST /usersService.UserService/Find
pub async fn find_users(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<FindUsersRequest>,
) -> ApiResult<ApiResponse<Vec<User>>> {
    Ok(ApiResponse::list(state.users().find(ctx.claims(), req).await?))
}

/// POST /usersService.UserService/GetGroupUsers
pub async fn get_group_users(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<ByGroupRequest<GroupId>>,
) -> ApiResult<ApiResponse<GroupUsers>> {
    let result = state
        .users()
        .get_group_users(ctx.claims(), &req.group_id)
        .await?;
    Ok(ApiResponse::success(result))
}

/// POST /usersService.UserService/Delete
pub async fn delete_user(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<ByIdRequest<UserId>>,
) -> ApiResult<ApiResponse<DeleteResponse>> {
    Ok(ApiResponse::success(state.users().delete(ctx.claims(), &req.id).await?))
}
