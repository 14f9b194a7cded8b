// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Scope Integration Tests
//!
//! Scope derivation and how the services apply it to real records.
//!
//! ## Test Categories
//!
//! - `test_derive_*`: The scope matrix for each role
//! - `test_find_*`: Queries narrowed to the caller's tenant
//! - `test_write_*`: Writes with forced group, owner and role
//! - `test_access_*`: Fetch-then-check admission for single records

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use ward_api::auth::{derive_scope, EntityKind, ScopeOp};
use ward_api::service::groups::{FindGroupsRequest, UpdateGroupRequest};
use ward_api::service::tasks::{CreateTaskRequest, FindTasksRequest};
use ward_api::service::users::{CreateUserRequest, FindUsersRequest, UpdateUserRequest};
use ward_api::ApiError;
use ward_core::{GroupPatch, Role, TaskId, TaskStatus, UserPatch};
use ward_tests::common::*;

// =============================================================================
// Derivation
// =============================================================================

#[tokio::test]
async fn test_derive_root_is_unrestricted_everywhere() {
    let world = World::seed().await;
    let claims = claims_for(&world.root);
    for kind in [EntityKind::User, EntityKind::Group, EntityKind::Task] {
        for op in [ScopeOp::Create, ScopeOp::Update, ScopeOp::Find] {
            assert!(derive_scope(&claims, kind, op).is_unrestricted());
        }
    }
}

#[tokio::test]
async fn test_derive_admin_and_member_matrix() {
    let world = World::seed().await;
    let admin = claims_for(&world.u1);
    let member = claims_for(&world.u2);

    let scope = derive_scope(&admin, EntityKind::Task, ScopeOp::Find);
    assert_eq!(scope.group_id(), Some(&world.g1.id));
    assert_eq!(scope.user_id(), None);

    let scope = derive_scope(&admin, EntityKind::User, ScopeOp::Create);
    assert_eq!(scope.role_ceiling(), Some(Role::Admin));

    let scope = derive_scope(&member, EntityKind::Task, ScopeOp::Update);
    assert_eq!(scope.group_id(), Some(&world.g1.id));
    assert_eq!(scope.user_id(), Some(&world.u2.id));

    let scope = derive_scope(&member, EntityKind::User, ScopeOp::Update);
    assert_eq!(scope.user_id(), Some(&world.u2.id));
    assert_eq!(scope.role_ceiling(), Some(Role::Member));

    let scope = derive_scope(&member, EntityKind::Group, ScopeOp::Find);
    assert_eq!(scope.group_id(), Some(&world.g1.id));
}

// =============================================================================
// Find
// =============================================================================

#[tokio::test]
async fn test_find_users_ignores_requested_foreign_group() {
    init_test_logging();
    let world = World::seed().await;
    let users = world
        .state()
        .users()
        .find(
            &claims_for(&world.u2),
            FindUsersRequest {
                group_id: Some(world.g2.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.group_id == world.g1.id));
}

#[tokio::test]
async fn test_find_tasks_by_role() {
    let world = World::seed().await;
    let tasks = world.state().tasks();

    let all = tasks
        .find(&claims_for(&world.root), FindTasksRequest::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let own = tasks
        .find(&claims_for(&world.u2), FindTasksRequest::default())
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].id, world.t1.id);

    let foreign = tasks
        .find(
            &claims_for(&world.u1),
            FindTasksRequest {
                user_id: Some(world.u3.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(foreign.is_empty());
}

#[tokio::test]
async fn test_find_groups_narrowed_to_own() {
    let world = World::seed().await;
    let groups = world
        .state()
        .groups()
        .find(&claims_for(&world.u1), FindGroupsRequest::default())
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, world.g1.id);

    let groups = world
        .state()
        .groups()
        .find(&claims_for(&world.root), FindGroupsRequest::default())
        .await
        .unwrap();
    assert_eq!(groups.len(), 3);
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn test_write_member_task_is_forced_to_self() {
    let world = World::seed().await;
    let task = world
        .state()
        .tasks()
        .create(
            &claims_for(&world.u2),
            CreateTaskRequest {
                name: "sneaky".to_string(),
                due: Utc::now() + Duration::days(1),
                description: String::new(),
                status: TaskStatus::NotStarted,
                user_id: world.u3.id.clone(),
                group_id: world.g2.id.clone(),
            },
        )
        .await
        .unwrap();
    assert_eq!(task.user_id, world.u2.id);
    assert_eq!(task.group_id, world.g1.id);
}

#[tokio::test]
async fn test_write_task_backfills_omitted_owner() {
    let world = World::seed().await;
    let task = world
        .state()
        .tasks()
        .create(
            &claims_for(&world.u1),
            CreateTaskRequest {
                name: "review".to_string(),
                due: Utc::now() + Duration::days(1),
                description: "quarterly".to_string(),
                status: TaskStatus::InProgress,
                user_id: Default::default(),
                group_id: Default::default(),
            },
        )
        .await
        .unwrap();
    assert_eq!(task.user_id, world.u1.id);
    assert_eq!(task.group_id, world.g1.id);
    assert_eq!(task.status, TaskStatus::InProgress);
}

#[tokio::test]
async fn test_write_admin_cannot_mint_root_or_reach_other_tenant() {
    let world = World::seed().await;
    let user = world
        .state()
        .users()
        .create(
            &claims_for(&world.u1),
            CreateUserRequest {
                username: "newbie".to_string(),
                email: "Newbie@G1.test".to_string(),
                password: TEST_PASSWORD.to_string(),
                first_name: String::new(),
                last_name: String::new(),
                role: Role::Root,
                group_id: world.g2.id.clone(),
            },
        )
        .await
        .unwrap();
    assert_eq!(user.role, Role::Admin);
    assert_eq!(user.group_id, world.g1.id);
    assert_eq!(user.email, "newbie@g1.test");
}

#[tokio::test]
async fn test_write_member_self_update_cannot_escalate() {
    let world = World::seed().await;
    let users = world.state().users();
    let claims = claims_for(&world.u2);

    let updated = users
        .update(
            &claims,
            UpdateUserRequest {
                id: world.u2.id.clone(),
                patch: UserPatch {
                    first_name: Some("Uma".to_string()),
                    role: Some(Role::Admin),
                    group_id: Some(world.g2.id.clone()),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Uma");
    assert_eq!(updated.role, Role::Member);
    assert_eq!(updated.group_id, world.g1.id);

    let err = users
        .update(
            &claims,
            UpdateUserRequest {
                id: world.u1.id.clone(),
                patch: UserPatch::default(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_write_admin_cannot_update_foreign_group() {
    let world = World::seed().await;
    let err = world
        .state()
        .groups()
        .update(
            &claims_for(&world.u1),
            UpdateGroupRequest {
                id: world.g2.id.clone(),
                patch: GroupPatch {
                    name: Some("taken".to_string()),
                },
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied { .. }));
}

// =============================================================================
// Single-record access
// =============================================================================

#[tokio::test]
async fn test_access_out_of_scope_is_denied_missing_is_not_found() {
    let world = World::seed().await;
    let claims = claims_for(&world.u1);

    let err = world.state().users().get(&claims, &world.u3.id).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let err = world.state().tasks().get(&claims, &world.t2.id).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let err = world
        .state()
        .tasks()
        .get(&claims, &TaskId::generate())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    let task = world.state().tasks().get(&claims, &world.t1.id).await.unwrap();
    assert_eq!(task.user_id, world.u2.id);

    let owner = world
        .state()
        .tasks()
        .get(&claims_for(&world.u2), &world.t1.id)
        .await
        .unwrap();
    assert_eq!(owner.id, world.t1.id);

    let err = world
        .state()
        .tasks()
        .get(&claims_for(&world.u3), &world.t1.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied { .. }));
}

#[tokio::test]
async fn test_access_member_cannot_touch_colleague_tasks() {
    let world = World::seed().await;
    let tasks = world.state().tasks();
    let colleague = claims_for(&world.u2);
    let admin_task = tasks
        .create(
            &claims_for(&world.u1),
            CreateTaskRequest {
                name: "admin only".to_string(),
                due: Utc::now() + Duration::days(2),
                description: String::new(),
                status: TaskStatus::NotStarted,
                user_id: Default::default(),
                group_id: Default::default(),
            },
        )
        .await
        .unwrap();

    let err = tasks.delete(&colleague, &admin_task.id).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let err = tasks
        .get_user_tasks(&colleague, &world.u1.id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let own = tasks.get_user_tasks(&colleague, &world.u2.id).await.unwrap();
    assert_eq!(own.len(), 1);
}

#[tokio::test]
async fn test_access_user_tasks_of_foreign_or_unknown_user() {
    let world = World::seed().await;
    let tasks = world.state().tasks();
    let admin = claims_for(&world.u1);

    let err = tasks.get_user_tasks(&admin, &world.u3.id).await.unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied { .. }));

    let err = tasks
        .get_user_tasks(&admin, &ward_core::UserId::generate())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    let colleague = tasks.get_user_tasks(&admin, &world.u2.id).await.unwrap();
    assert_eq!(colleague.len(), 1);
    assert_eq!(colleague[0].id, world.t1.id);

    let foreign = tasks
        .get_user_tasks(&claims_for(&world.root), &world.u3.id)
        .await
        .unwrap();
    assert_eq!(foreign.len(), 1);
}

#[tokio::test]
async fn test_access_group_listings() {
    let world = World::seed().await;
    let tasks = world.state().tasks();

    let err = tasks
        .get_group_tasks(&claims_for(&world.u1), &world.g2.id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let g2 = tasks
        .get_group_tasks(&claims_for(&world.root), &world.g2.id)
        .await
        .unwrap();
    assert_eq!(g2.len(), 1);
    assert_eq!(g2[0].id, world.t2.id);

    let listing = world
        .state()
        .users()
        .get_group_users(&claims_for(&world.u1), &world.g1.id)
        .await
        .unwrap();
    assert_eq!(listing.group.id, world.g1.id);
    assert_eq!(listing.users.len(), 2);
}
