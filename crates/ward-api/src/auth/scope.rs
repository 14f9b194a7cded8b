// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request scoping.
//!
//! Given verified claims, these functions narrow an incoming filter or
//! template so that a request cannot leave the caller's data boundary:
//!
//! | Caller | create | update | find |
//! |--------|--------|--------|------|
//! | Root   | unrestricted | unrestricted | unrestricted |
//! | Admin  | own group, role up to admin | own group | own group |
//! | Member | own group, role member | own group, self only | own group |
//!
//! Tasks are additionally pinned to the caller's own user id unless the
//! caller is an admin or root. Everything here is pure; no store is touched.

use std::fmt;

use tracing::debug;
use ward_core::{
    Group, GroupFilter, GroupId, Role, Task, TaskFilter, TaskPatch, User, UserFilter, UserId,
    UserPatch,
};

use super::TokenClaims;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// Kinds
// =============================================================================

/// Entity a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Group,
    Task,
}

/// What the request does with the entity. Deletes scope as updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeOp {
    Create,
    Update,
    Find,
}

impl fmt::Display for ScopeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScopeOp::Create => "create",
            ScopeOp::Update => "update",
            ScopeOp::Find => "find",
        })
    }
}

// =============================================================================
// Scope
// =============================================================================

/// The restriction derived for one caller, entity and operation.
///
/// `None` fields are unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    group_id: Option<GroupId>,
    user_id: Option<UserId>,
    role_ceiling: Option<Role>,
}

impl Scope {
    /// A scope with no restriction.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn group_id(&self) -> Option<&GroupId> {
        self.group_id.as_ref()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Highest role the caller may assign.
    pub fn role_ceiling(&self) -> Option<Role> {
        self.role_ceiling
    }

    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Overrides the requested user filter with the scope's fields.
    pub fn restrict_users(&self, mut filter: UserFilter) -> UserFilter {
        if let Some(group_id) = &self.group_id {
            filter.group_id = Some(group_id.clone());
        }
        if let Some(user_id) = &self.user_id {
            filter.id = Some(user_id.clone());
        }
        filter
    }

    /// Overrides the requested task filter with the scope's fields.
    pub fn restrict_tasks(&self, mut filter: TaskFilter) -> TaskFilter {
        if let Some(group_id) = &self.group_id {
            filter.group_id = Some(group_id.clone());
        }
        if let Some(user_id) = &self.user_id {
            filter.user_id = Some(user_id.clone());
        }
        filter
    }

    /// Overrides the requested group filter with the scope's group.
    pub fn restrict_groups(&self, mut filter: GroupFilter) -> GroupFilter {
        if let Some(group_id) = &self.group_id {
            filter.id = Some(group_id.clone());
        }
        filter
    }

    // =========================================================================
    // Admission
    // =========================================================================

    pub fn admits_user(&self, user: &User) -> bool {
        self.group_id.as_ref().is_none_or(|g| *g == user.group_id)
            && self.user_id.as_ref().is_none_or(|u| *u == user.id)
    }

    pub fn admits_task(&self, task: &Task) -> bool {
        self.group_id.as_ref().is_none_or(|g| *g == task.group_id)
            && self.user_id.as_ref().is_none_or(|u| *u == task.user_id)
    }

    pub fn admits_group(&self, group: &Group) -> bool {
        self.group_id.as_ref().is_none_or(|g| *g == group.id)
    }

    // =========================================================================
    // Templates
    // =========================================================================

    fn clamp_role(&self, role: Role) -> Role {
        match self.role_ceiling {
            Some(ceiling) => role.min(ceiling),
            None => role,
        }
    }

    /// Forces the scope's fields onto a user about to be created.
    pub fn apply_to_user(&self, user: &mut User) {
        if let Some(group_id) = &self.group_id {
            user.group_id = group_id.clone();
        }
        user.role = self.clamp_role(user.role);
    }

    /// Forces the scope's fields onto a user update.
    pub fn apply_to_user_patch(&self, patch: &mut UserPatch) {
        if let Some(group_id) = &self.group_id {
            patch.group_id = Some(group_id.clone());
        }
        if let Some(role) = patch.role {
            patch.role = Some(self.clamp_role(role));
        }
        if self.role_ceiling == Some(Role::Member) {
            patch.role = Some(Role::Member);
        }
    }

    /// Forces the scope's fields onto a task about to be created.
    pub fn apply_to_task(&self, task: &mut Task) {
        if let Some(group_id) = &self.group_id {
            task.group_id = group_id.clone();
        }
        if let Some(user_id) = &self.user_id {
            task.user_id = user_id.clone();
        }
    }

    /// Forces the scope's fields onto a task update.
    pub fn apply_to_task_patch(&self, patch: &mut TaskPatch) {
        if let Some(group_id) = &self.group_id {
            patch.group_id = Some(group_id.clone());
        }
        if let Some(user_id) = &self.user_id {
            patch.user_id = Some(user_id.clone());
        }
    }
}

// =============================================================================
// Derivation
// =============================================================================

/// Derives the scope for `claims` acting on `kind` with `op`.
pub fn derive_scope(claims: &TokenClaims, kind: EntityKind, op: ScopeOp) -> Scope {
    let own_group = Some(claims.group_id().clone());
    let own_user = Some(claims.user_id().clone());

    let scope = match (claims.role(), kind, op) {
        (Role::Root, _, _) => Scope::unrestricted(),

        (_, EntityKind::Group, _) => Scope {
            group_id: own_group,
            ..Default::default()
        },

        (Role::Admin, EntityKind::User, ScopeOp::Find) => Scope {
            group_id: own_group,
            ..Default::default()
        },
        (Role::Admin, EntityKind::User, _) => Scope {
            group_id: own_group,
            user_id: None,
            role_ceiling: Some(Role::Admin),
        },
        (Role::Member, EntityKind::User, ScopeOp::Find) => Scope {
            group_id: own_group,
            ..Default::default()
        },
        (Role::Member, EntityKind::User, ScopeOp::Create) => Scope {
            group_id: own_group,
            user_id: None,
            role_ceiling: Some(Role::Member),
        },
        (Role::Member, EntityKind::User, ScopeOp::Update) => Scope {
            group_id: own_group,
            user_id: own_user,
            role_ceiling: Some(Role::Member),
        },

        (Role::Admin, EntityKind::Task, _) => Scope {
            group_id: own_group,
            ..Default::default()
        },
        (Role::Member, EntityKind::Task, _) => Scope {
            group_id: own_group,
            user_id: own_user,
            role_ceiling: None,
        },
    };

    debug!(
        user_id = %claims.user_id(),
        role = %claims.role(),
        kind = ?kind,
        op = %op,
        restricted = !scope.is_unrestricted(),
        "Scope derived"
    );
    scope
}

/// Fills an omitted task owner or group from the caller's own claims.
pub fn backfill_task(claims: &TokenClaims, task: &mut Task) {
    if !task.user_id.is_valid() {
        task.user_id = claims.user_id().clone();
    }
    if !task.group_id.is_valid() {
        task.group_id = claims.group_id().clone();
    }
}

/// Returns `target` if the caller may address that group.
pub fn verify_group_request_scope(claims: &TokenClaims, target: &GroupId) -> ApiResult<GroupId> {
    if claims.is_root_admin() || claims.group_id() == target {
        Ok(target.clone())
    } else {
        Err(ApiError::permission_denied(format!(
            "group {} is outside the caller's scope",
            target
        )))
    }
}

/// Returns the filter under which the caller may address user `target`.
///
/// Admins and root admins may address any user (admins within their own
/// group). A member may update only themselves and find only within their
/// own group.
pub fn verify_user_request_scope(
    claims: &TokenClaims,
    target: &UserId,
    op: ScopeOp,
) -> ApiResult<UserFilter> {
    let filter = UserFilter::by_id(target.clone());
    match (claims.role(), op) {
        (Role::Root, _) => Ok(filter),
        (Role::Admin, _) => Ok(UserFilter {
            group_id: Some(claims.group_id().clone()),
            ..filter
        }),
        (Role::Member, ScopeOp::Update) if claims.user_id() == target => Ok(UserFilter {
            group_id: Some(claims.group_id().clone()),
            ..filter
        }),
        (Role::Member, ScopeOp::Find) => Ok(UserFilter {
            group_id: Some(claims.group_id().clone()),
            ..filter
        }),
        (Role::Member, op) => Err(ApiError::permission_denied(format!(
            "members may not {} user {}",
            op, target
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================
