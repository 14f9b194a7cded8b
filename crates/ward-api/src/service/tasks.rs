// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Task operations.
//!
//! Members only ever see their own tasks; admins see their whole group.
//! Writes back-fill an omitted owner or group from the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use ward_core::{
    GroupId, Task, TaskFilter, TaskId, TaskPatch, TaskStatus, TaskStore, UserFilter, UserId,
    UserStore,
};

use crate::auth::{
    backfill_task, derive_scope, verify_group_request_scope, verify_user_request_scope,
    EntityKind, ScopeOp, TokenClaims,
};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    pub due: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub group_id: GroupId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub id: TaskId,
    #[serde(flatten)]
    pub patch: TaskPatch,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FindTasksRequest {
    pub user_id: Option<UserId>,
    pub group_id: Option<GroupId>,
    pub status: Option<TaskStatus>,
}

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>, users: Arc<dyn UserStore>) -> Self {
        Self { tasks, users }
    }

    /// Checks that the task's owner exists and belongs to the task's group.
    async fn check_owner(&self, task: &Task) -> ApiResult<()> {
        let owner = self
            .users
            .find(&UserFilter::by_id(task.user_id.clone()))
            .await?;
        task.check_owner(&owner)?;
        Ok(())
    }

    /// Loads a task and checks it against the caller's scope.
    async fn load(&self, claims: &TokenClaims, id: &TaskId, op: ScopeOp) -> ApiResult<Task> {
        let task = self.tasks.find(&TaskFilter::by_id(id.clone())).await?;
        if !derive_scope(claims, EntityKind::Task, op).admits_task(&task) {
            return Err(ApiError::permission_denied(format!(
                "task {} is outside the caller's scope",
                id
            )));
        }
        Ok(task)
    }

    pub async fn create(&self, claims: &TokenClaims, req: CreateTaskRequest) -> ApiResult<Task> {
        let mut task = Task::new(req.name, req.due, req.user_id, req.group_id)
            .with_description(req.description);
        task.status = req.status;

        backfill_task(claims, &mut task);
        derive_scope(claims, EntityKind::Task, ScopeOp::Create).apply_to_task(&mut task);
        task.validate_for_create()?;
        self.check_owner(&task).await?;

        let task = self.tasks.create(task).await?;
        info!(task_id = %task.id, user_id = %task.user_id, "Task created");
        Ok(task)
    }

    pub async fn update(&self, claims: &TokenClaims, req: UpdateTaskRequest) -> ApiResult<Task> {
        let mut task = self.load(claims, &req.id, ScopeOp::Update).await?;
        let mut patch = req.patch;
        derive_scope(claims, EntityKind::Task, ScopeOp::Update).apply_to_task_patch(&mut patch);
        patch.apply(&mut task);
        self.check_owner(&task).await?;

        let task = self.tasks.update(task).await?;
        info!(task_id = %task.id, updated_by = %claims.user_id(), "Task updated");
        Ok(task)
    }

    pub async fn get(&self, claims: &TokenClaims, id: &TaskId) -> ApiResult<Task> {
        self.load(claims, id, ScopeOp::Find).await
    }

    pub async fn find(&self, claims: &TokenClaims, req: FindTasksRequest) -> ApiResult<Vec<Task>> {
        let requested = TaskFilter {
            id: None,
            user_id: req.user_id,
            group_id: req.group_id,
            status: req.status,
        };
        let filter = derive_scope(claims, EntityKind::Task, ScopeOp::Find).restrict_tasks(requested);
        Ok(self.tasks.find_many(&filter).await?)
    }

    pub async fn get_group_tasks(
        &self,
        claims: &TokenClaims,
        group_id: &GroupId,
    ) -> ApiResult<Vec<Task>> {
        let group_id = verify_group_request_scope(claims, group_id)?;
        let filter = derive_scope(claims, EntityKind::Task, ScopeOp::Find)
            .restrict_tasks(TaskFilter::in_group(group_id));
        Ok(self.tasks.find_many(&filter).await?)
    }

    pub async fn get_user_tasks(
        &self,
        claims: &TokenClaims,
        user_id: &UserId,
    ) -> ApiResult<Vec<Task>> {
        let scope = derive_scope(claims, EntityKind::Task, ScopeOp::Find);
        if scope.user_id().is_some_and(|own| own != user_id) {
            return Err(ApiError::permission_denied(format!(
                "tasks of user {} are outside the caller's scope",
                user_id
            )));
        }
        let allowed = verify_user_request_scope(claims, user_id, ScopeOp::Find)?;
        let owner = self.users.find(&UserFilter::by_id(user_id.clone())).await?;
        if !allowed.matches(&owner) {
            return Err(ApiError::permission_denied(format!(
                "user {} is outside the caller's scope",
                user_id
            )));
        }
        let filter = scope.restrict_tasks(TaskFilter::owned_by(owner.id));
        Ok(self.tasks.find_many(&filter).await?)
    }

    pub async fn delete(&self, claims: &TokenClaims, id: &TaskId) -> ApiResult<Task> {
        let task = self.load(claims, id, ScopeOp::Update).await?;
        let deleted = self
            .tasks
            .delete(&task.id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("task {}", id)))?;
        info!(task_id = %deleted.id, deleted_by = %claims.user_id(), "Task deleted");
        Ok(deleted)
    }
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskService").finish_non_exhaustive()
    }
}
