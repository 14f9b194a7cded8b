// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Group operations.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use ward_core::{CascadeDeleter, Group, GroupFilter, GroupId, GroupPatch, GroupStore};

use crate::auth::{derive_scope, verify_group_request_scope, EntityKind, ScopeOp, TokenClaims};
use crate::error::{ApiError, ApiResult};
use crate::response::DeleteResponse;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    pub id: GroupId,
    #[serde(flatten)]
    pub patch: GroupPatch,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FindGroupsRequest {
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupStore>,
    cascade: CascadeDeleter,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupStore>, cascade: CascadeDeleter) -> Self {
        Self { groups, cascade }
    }

    /// Creates a regular group. The root-admin group is only ever seeded.
    pub async fn create(&self, claims: &TokenClaims, req: CreateGroupRequest) -> ApiResult<Group> {
        if !derive_scope(claims, EntityKind::Group, ScopeOp::Create).is_unrestricted() {
            return Err(ApiError::permission_denied("root role required"));
        }
        let group = self.groups.create(Group::new(req.name.trim())).await?;
        info!(group_id = %group.id, created_by = %claims.user_id(), "Group created");
        Ok(group)
    }

    pub async fn update(&self, claims: &TokenClaims, req: UpdateGroupRequest) -> ApiResult<Group> {
        let id = verify_group_request_scope(claims, &req.id)?;
        let mut group = self.groups.find(&GroupFilter::by_id(id)).await?;
        req.patch.apply(&mut group);
        let group = self.groups.update(group).await?;
        info!(group_id = %group.id, updated_by = %claims.user_id(), "Group updated");
        Ok(group)
    }

    pub async fn get(&self, claims: &TokenClaims, id: &GroupId) -> ApiResult<Group> {
        let id = verify_group_request_scope(claims, id)?;
        Ok(self.groups.find(&GroupFilter::by_id(id)).await?)
    }

    pub async fn find(&self, claims: &TokenClaims, req: FindGroupsRequest) -> ApiResult<Vec<Group>> {
        let requested = GroupFilter {
            name: req.name,
            ..Default::default()
        };
        let filter = derive_scope(claims, EntityKind::Group, ScopeOp::Find).restrict_groups(requested);
        Ok(self.groups.find_many(&filter).await?)
    }

    /// Removes every user, task and user file of the group, then the group.
    ///
    /// If the cascade fails part-way the group record is kept, so the call
    /// can be retried.
    pub async fn delete(&self, claims: &TokenClaims, id: &GroupId) -> ApiResult<DeleteResponse> {
        let id = verify_group_request_scope(claims, id)?;
        let group = self.groups.find(&GroupFilter::by_id(id)).await?;
        if group.root_admin {
            return Err(ApiError::conflict("the root admin group cannot be deleted"));
        }

        let report = self.cascade.delete_group_cascade(&group.id).await?;
        self.groups.delete(&group.id).await?;

        info!(group_id = %group.id, deleted_by = %claims.user_id(), removed = report.total_removed(), "Group deleted");
        Ok(DeleteResponse::from_report(group.id.as_str(), &report))
    }
}

impl std::fmt::Debug for GroupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupService").finish_non_exhaustive()
    }
}
