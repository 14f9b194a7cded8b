// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User operations, narrowed by the caller's scope.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use ward_core::{
    CascadeDeleter, Group, GroupFilter, GroupId, GroupStore, Role, User, UserFilter, UserId,
    UserPatch, UserStore,
};

use crate::auth::password::hash_password;
use crate::auth::{
    derive_scope, verify_group_request_scope, verify_user_request_scope, EntityKind, ScopeOp,
    TokenClaims,
};
use crate::error::{ApiError, ApiResult};
use crate::response::DeleteResponse;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub group_id: GroupId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: UserId,
    #[serde(flatten)]
    pub patch: UserPatch,
}

/// Query for `UserService/Find`. Unset fields match anything.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FindUsersRequest {
    pub group_id: Option<GroupId>,
    pub email: Option<String>,
    pub username: Option<String>,
}

/// A group together with its members.
#[derive(Debug, Serialize)]
pub struct GroupUsers {
    pub group: Group,
    pub users: Vec<User>,
}

// =============================================================================
// UserService
// =============================================================================

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    groups: Arc<dyn GroupStore>,
    cascade: CascadeDeleter,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        groups: Arc<dyn GroupStore>,
        cascade: CascadeDeleter,
    ) -> Self {
        Self {
            users,
            groups,
            cascade,
        }
    }

    pub async fn create(&self, claims: &TokenClaims, req: CreateUserRequest) -> ApiResult<User> {
        if req.password.is_empty() {
            return Err(ApiError::validation(
                "missing the following user fields: password",
            ));
        }
        let mut user = User::new(
            req.username,
            req.email.trim().to_lowercase(),
            hash_password(&req.password)?,
            req.group_id,
            req.role,
        )
        .with_name(req.first_name, req.last_name);

        derive_scope(claims, EntityKind::User, ScopeOp::Create).apply_to_user(&mut user);
        user.validate_for_create()?;

        let group = self
            .groups
            .find(&GroupFilter::by_id(user.group_id.clone()))
            .await?;
        user.check_group(&group)?;

        let user = self.users.create(user).await?;
        info!(user_id = %user.id, group_id = %user.group_id, role = %user.role, created_by = %claims.user_id(), "User created");
        Ok(user)
    }

    pub async fn update(&self, claims: &TokenClaims, req: UpdateUserRequest) -> ApiResult<User> {
        let filter = verify_user_request_scope(claims, &req.id, ScopeOp::Update)?;
        let mut patch = req.patch;
        patch.email = patch.email.map(|e| e.trim().to_lowercase());
        derive_scope(claims, EntityKind::User, ScopeOp::Update).apply_to_user_patch(&mut patch);

        let mut user = self.users.find(&filter).await?;
        patch.apply(&mut user);

        let group = self
            .groups
            .find(&GroupFilter::by_id(user.group_id.clone()))
            .await?;
        user.check_group(&group)?;

        let user = self.users.update(user).await?;
        info!(user_id = %user.id, updated_by = %claims.user_id(), "User updated");
        Ok(user)
    }

    /// Fetches a user, denying access when it lies outside the caller's scope.
    pub async fn get(&self, claims: &TokenClaims, id: &UserId) -> ApiResult<User> {
        let user = self.users.find(&UserFilter::by_id(id.clone())).await?;
        if !derive_scope(claims, EntityKind::User, ScopeOp::Find).admits_user(&user) {
            return Err(ApiError::permission_denied(format!(
                "user {} is outside the caller's scope",
                id
            )));
        }
        Ok(user)
    }

    pub async fn find(&self, claims: &TokenClaims, req: FindUsersRequest) -> ApiResult<Vec<User>> {
        let requested = UserFilter {
            id: None,
            group_id: req.group_id,
            email: req.email.map(|e| e.trim().to_lowercase()),
            username: req.username,
        };
        let filter = derive_scope(claims, EntityKind::User, ScopeOp::Find).restrict_users(requested);
        Ok(self.users.find_many(&filter).await?)
    }

    /// Fetches a group and its members concurrently.
    pub async fn get_group_users(
        &self,
        claims: &TokenClaims,
        group_id: &GroupId,
    ) -> ApiResult<GroupUsers> {
        let group_id = verify_group_request_scope(claims, group_id)?;
        let group_filter = GroupFilter::by_id(group_id.clone());
        let user_filter = UserFilter::in_group(group_id);
        let (group, users) = tokio::join!(
            self.groups.find(&group_filter),
            self.users.find_many(&user_filter)
        );
        Ok(GroupUsers {
            group: group?,
            users: users?,
        })
    }

    /// Removes a user's image and tasks, then the user record.
    pub async fn delete(&self, claims: &TokenClaims, id: &UserId) -> ApiResult<DeleteResponse> {
        let filter = verify_user_request_scope(claims, id, ScopeOp::Update)?;
        let user = self.users.find(&filter).await?;
        if user.is_root_admin() && user.id == *claims.user_id() {
            return Err(ApiError::conflict("root admin cannot delete itself"));
        }

        let report = self.cascade.delete_user_cascade(&user).await?;
        self.users.delete(&user.id).await?;

        info!(user_id = %user.id, deleted_by = %claims.user_id(), removed = report.total_removed(), "User deleted");
        Ok(DeleteResponse::from_report(user.id.as_str(), &report))
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
