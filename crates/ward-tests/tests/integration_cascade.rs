// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Cascade Integration Tests
//!
//! Group and user cascades against the in-memory stores, with failures
//! injected through the mock stores.
//!
//! ## Test Categories
//!
//! - `test_group_cascade_*`: Deleting everything a group owns
//! - `test_user_cascade_*`: Deleting a user's image and tasks
//! - `test_service_*`: The delete operations built on the cascades

use ward_core::{
    BlobStore, CascadeDeleter, CascadeStep, FileFilter, FileStore, GroupFilter, GroupStore,
    TaskFilter, TaskStore, UserFilter, UserStore, WardError,
};
use ward_tests::common::*;

fn deleter(world: &World) -> CascadeDeleter {
    CascadeDeleter::new(
        world.mocks.users.clone(),
        world.mocks.tasks.clone(),
        world.mocks.files.clone(),
    )
}

// =============================================================================
// Group Cascade
// =============================================================================

#[tokio::test]
async fn test_group_cascade_removes_everything_in_group() {
    init_test_logging();
    let world = World::seed().await;
    let memory = &world.mocks.memory;
    for name in ["T1b", "T1c"] {
        memory
            .tasks
            .create(TaskBuilder::for_user(&world.u1).name(name).build())
            .await
            .unwrap();
    }

    let report = deleter(&world)
        .delete_group_cascade(&world.g1.id)
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.removed(CascadeStep::GroupUsers), Some(2));
    assert_eq!(report.removed(CascadeStep::GroupTasks), Some(3));
    assert_eq!(report.removed(CascadeStep::GroupFiles), Some(1));
    assert_eq!(report.total_removed(), 6);

    assert!(memory
        .users
        .find_many(&UserFilter::in_group(world.g1.id.clone()))
        .await
        .unwrap()
        .is_empty());
    assert!(memory
        .files
        .find(&FileFilter::by_id(world.image.id.clone()))
        .await
        .is_err());
    assert!(memory
        .blobs
        .get(&world.image.bucket_name, &world.image.blob_id)
        .await
        .unwrap()
        .is_none());

    // The other tenant and the group record itself are untouched.
    assert_eq!(
        memory
            .tasks
            .find_many(&TaskFilter::in_group(world.g2.id.clone()))
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(memory.groups.find(&GroupFilter::by_id(world.g1.id.clone())).await.is_ok());
}

#[tokio::test]
async fn test_group_cascade_task_failure_keeps_other_branches() {
    let world = World::seed().await;
    let memory = &world.mocks.memory;
    world.mocks.tasks.switch.set_fail_writes(true);

    let report = deleter(&world)
        .run_group_cascade(&world.g1.id)
        .await
        .unwrap();

    assert!(!report.is_complete());
    let (step, error) = report.first_failure().unwrap();
    assert_eq!(step, CascadeStep::GroupTasks);
    assert!(error.is_retryable());
    assert_eq!(report.removed(CascadeStep::GroupUsers), Some(2));
    assert_eq!(report.removed(CascadeStep::GroupFiles), Some(1));

    // Users and files went, the task stayed.
    assert!(memory
        .users
        .find_many(&UserFilter::in_group(world.g1.id.clone()))
        .await
        .unwrap()
        .is_empty());
    assert!(memory
        .files
        .find(&FileFilter::by_id(world.image.id.clone()))
        .await
        .is_err());
    assert!(memory
        .tasks
        .find(&TaskFilter::by_id(world.t1.id.clone()))
        .await
        .is_ok());

    let err = report.into_result().unwrap_err();
    match err {
        WardError::CascadeFailure {
            step, completed, ..
        } => {
            assert_eq!(step, "group_tasks");
            assert!(completed.contains(&"group_users"));
            assert!(completed.contains(&"group_files"));
        }
        other => panic!("expected cascade failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_group_cascade_is_retryable_after_failure() {
    let world = World::seed().await;
    let cascade = deleter(&world);

    world.mocks.tasks.switch.fail_next_write();
    assert!(cascade.delete_group_cascade(&world.g1.id).await.is_err());

    let report = cascade.delete_group_cascade(&world.g1.id).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.removed(CascadeStep::GroupTasks), Some(1));
    assert_eq!(report.removed(CascadeStep::GroupUsers), Some(0));
}

#[tokio::test]
async fn test_group_cascade_lookup_failure_runs_nothing() {
    let world = World::seed().await;
    world.mocks.users.switch.set_fail_reads(true);

    let err = deleter(&world)
        .run_group_cascade(&world.g1.id)
        .await
        .unwrap_err();
    assert!(err.is_retryable());

    world.mocks.reset();
    assert_eq!(
        world
            .mocks
            .memory
            .users
            .find_many(&UserFilter::in_group(world.g1.id.clone()))
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn test_group_cascade_rejects_empty_id() {
    let world = World::seed().await;
    let err = deleter(&world)
        .delete_group_cascade(&ward_core::GroupId::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, WardError::Validation { .. }));
}

// =============================================================================
// User Cascade
// =============================================================================

#[tokio::test]
async fn test_user_cascade_removes_image_and_tasks() {
    let world = World::seed().await;
    let report = deleter(&world).delete_user_cascade(&world.u2).await.unwrap();

    assert_eq!(report.removed(CascadeStep::UserImage), Some(1));
    assert_eq!(report.removed(CascadeStep::UserTasks), Some(1));
    assert!(world
        .mocks
        .memory
        .users
        .find(&UserFilter::by_id(world.u2.id.clone()))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_user_cascade_without_image_skips_file_branch() {
    let world = World::seed().await;
    let report = deleter(&world).delete_user_cascade(&world.u1).await.unwrap();

    assert_eq!(report.steps().len(), 1);
    assert_eq!(report.removed(CascadeStep::UserImage), None);
    assert_eq!(report.removed(CascadeStep::UserTasks), Some(0));
}

#[tokio::test]
async fn test_user_cascade_file_failure_still_removes_tasks() {
    let world = World::seed().await;
    world.mocks.files.switch.set_fail_writes(true);

    let report = deleter(&world).run_user_cascade(&world.u2).await.unwrap();
    assert_eq!(report.first_failure().map(|(s, _)| s), Some(CascadeStep::UserImage));
    assert_eq!(report.removed(CascadeStep::UserTasks), Some(1));
}

#[tokio::test]
async fn test_user_cascade_ignores_foreign_image_reference() {
    let world = World::seed().await;
    let intruder = world
        .mocks
        .memory
        .users
        .create(
            UserBuilder::new(world.g2.id.clone())
                .username("intruder")
                .email("intruder@g2.test")
                .image(world.image.id.clone())
                .build(),
        )
        .await
        .unwrap();

    let report = deleter(&world).delete_user_cascade(&intruder).await.unwrap();
    assert_eq!(report.removed(CascadeStep::UserImage), Some(0));
    assert!(world
        .mocks
        .memory
        .files
        .find(&FileFilter::by_id(world.image.id.clone()))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_group_cascade_ignores_foreign_image_reference() {
    let world = World::seed().await;
    let memory = &world.mocks.memory;
    memory
        .users
        .update(world.u3.clone().with_image(world.image.id.clone()))
        .await
        .unwrap();

    let report = deleter(&world)
        .delete_group_cascade(&world.g2.id)
        .await
        .unwrap();
    assert_eq!(report.removed(CascadeStep::GroupFiles), Some(0));
    assert_eq!(report.removed(CascadeStep::GroupUsers), Some(1));
    assert!(memory
        .files
        .find(&FileFilter::by_id(world.image.id.clone()))
        .await
        .is_ok());
    assert_eq!(memory.blobs.blob_count(), 1);
}

// =============================================================================
// Services
// =============================================================================

#[tokio::test]
async fn test_service_group_delete_keeps_group_on_failure() {
    let world = World::seed().await;
    let groups = world.state().groups();
    let root = claims_for(&world.root);

    world.mocks.tasks.switch.set_fail_writes(true);
    assert!(groups.delete(&root, &world.g1.id).await.is_err());
    assert!(world
        .mocks
        .memory
        .groups
        .find(&GroupFilter::by_id(world.g1.id.clone()))
        .await
        .is_ok());

    world.mocks.reset();
    let response = groups.delete(&root, &world.g1.id).await.unwrap();
    assert_eq!(response.id, world.g1.id.as_str());
    assert_eq!(world.mocks.memory.groups.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_service_root_group_cannot_be_deleted() {
    let world = World::seed().await;
    let err = world
        .state()
        .groups()
        .delete(&claims_for(&world.root), &world.root_group.id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_service_user_delete_cascades() {
    let world = World::seed().await;
    let response = world
        .state()
        .users()
        .delete(&claims_for(&world.u1), &world.u2.id)
        .await
        .unwrap();

    assert_eq!(response.id, world.u2.id.as_str());
    assert!(response.removed.iter().any(|r| r.step == "user_tasks" && r.count == 1));
    let memory = &world.mocks.memory;
    assert!(memory.users.find(&UserFilter::by_id(world.u2.id.clone())).await.is_err());
    assert!(memory.tasks.find(&TaskFilter::by_id(world.t1.id.clone())).await.is_err());
    assert_eq!(memory.blobs.blob_count(), 0);
}
