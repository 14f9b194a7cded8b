// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `tasksService.TaskService` handlers.

use axum::extract::State;
use ward_core::{GroupId, Task, TaskId, UserId};

use super::{ByGroupRequest, ByIdRequest, ByUserRequest};
use crate::error::ApiResult;
use crate::extractors::{Auth, ValidatedJson};
use crate::response::ApiResponse;
use crate::service::tasks::{CreateTaskRequest, FindTasksRequest, UpdateTaskRequest};
use crate::state::AppState;

/// POST /tasksService.TaskService/Create
pub async fn create_task(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    Ok(ApiResponse::success(state.tasks().create(ctx.claims(), req).await?))
}

/// POST /tasksService.TaskService/Update
pub async fn update_task(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    Ok(ApiResponse::success(state.tasks().update(ctx.claims(), req).await?))
}

/// POST /tasksService.TaskService/Get
pub async fn get_task(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<ByIdRequest<TaskId>>,
) -> ApiResult<ApiResponse<Task>> {
    Ok(ApiResponse::success(state.tasks().get(ctx.claims(), &req.id).await?))
}

/// POST /tasksService.TaskService/Find
pub async fn find_tasks(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<FindTasksRequest>,
) -> ApiResult<ApiResponse<Vec<Task>>> {
    Ok(ApiResponse::list(state.tasks().find(ctx.claims(), req).await?))
}

/// POST /tasksService.TaskService/GetGroupTasks
pub async fn get_group_tasks(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<ByGroupRequest<GroupId>>,
) -> ApiResult<ApiResponse<Vec<Task>>> {
    let tasks = state
        .tasks()
        .get_group_tasks(ctx.claims(), &req.group_id)
        .await?;
    Ok(ApiResponse::list(tasks))
}

/// POST /tasksService.TaskService/GetUserTasks
pub async fn get_user_tasks(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<ByUserRequest<UserId>>,
) -> ApiResult<ApiResponse<Vec<Task>>> {
    let tasks = state
        .tasks()
        .get_user_tasks(ctx.claims(), &req.user_id)
        .await?;
    Ok(ApiResponse::list(tasks))
}

/// POST /tasksService.TaskService/Delete
pub async fn delete_task(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(req): ValidatedJson<ByIdRequest<TaskId>>,
) -> ApiResult<ApiResponse<Task>> {
    Ok(ApiResponse::success(state.tasks().delete(ctx.claims(), &req.id).await?))
}
