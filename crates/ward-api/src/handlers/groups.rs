// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `groupsService.GroupService` handlers.

use axum::extract::State;
use ward_core::{Group, GroupId};

use super::ByIdRequest;
use crate::error::ApiResult;
use crate::extractors::{Auth, ValidatedJson};
use crate::response::{ApiResponse, DeleteResponse};
use crate::service::groups::{CreateGroupRequest, FindGroupsRequest, UpdateGroupRequest};
use crate::state::AppState;

/// POST /groupsService.GroupService/Create
pub async fn create_group(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<CreateGroupRequest>,
) -> ApiResult<ApiResponse<Group>> {
    Ok(ApiResponse::success(state.groups().create(ctx.claims(), req).await?))
}

/// POST /groupsService.GroupService/Update
pub async fn update_group(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<UpdateGroupRequest>,
) -> ApiResult<ApiResponse<Group>> {
    Ok(ApiResponse::success(state.groups().update(ctx.claims(), req).await?))
}

/// POST /groupsService.GroupService/Get
pub async fn get_group(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<ByIdRequest<GroupId>>,
) -> ApiResult<ApiResponse<Group>> {
    Ok(ApiResponse::success(state.groups().get(ctx.claims(), &req.id).await?))
}

/// POST /groupsService.GroupService/Find
pub async fn find_groups(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<FindGroupsRequest>,
) -> ApiResult<ApiResponse<Vec<Group>>> {
    Ok(ApiResponse::list(state.groups().find(ctx.claims(), req).await?))
}

/// POST /groupsService.GroupService/Delete
pub async fn delete_group(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<ByIdRequest<GroupId>>,
) -> ApiResult<ApiResponse<DeleteResponse>> {
    Ok(ApiResponse::success(state.groups().delete(ctx.claims(), &req.id).await?))
}
