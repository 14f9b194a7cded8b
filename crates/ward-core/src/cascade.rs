// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Cascading deletion of dependent records.
//!
//! Deleting a group removes its users, their files and the group's tasks.
//! Deleting a user removes the user's image and tasks. The branches of a
//! cascade run as independent tokio tasks and are always awaited to
//! completion, even after one of them failed.
//!
//! # Guarantees
//!
//! A cascade is not atomic. When a branch fails, branches that already
//! committed stay committed and the [`CascadeReport`] says which ones did.
//! Stores treat deleting a missing record as success, so a failed cascade
//! can be retried as a whole.
//!
//! # Example
//!
//! ```rust,ignore
//! let deleter = CascadeDeleter::new(users, tasks, files);
//! deleter.delete_group_cascade(&group_id).await?;
//! groups.delete(&group_id).await?;
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{WardError, WardResult};
use crate::model::{FileFilter, TaskFilter, User, UserFilter};
use crate::store::{FileStore, TaskStore, UserStore};
use crate::types::{FileId, GroupId};

// =============================================================================
// Steps and Report
// =============================================================================

/// A single branch of a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeStep {
    /// Files owned by the users of a group.
    GroupFiles,
    /// Users of a group.
    GroupUsers,
    /// Tasks of a group.
    GroupTasks,
    /// Profile image of a user.
    UserImage,
    /// Tasks of a user.
    UserTasks,
}

impl CascadeStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            CascadeStep::GroupFiles => "group_files",
            CascadeStep::GroupUsers => "group_users",
            CascadeStep::GroupTasks => "group_tasks",
            CascadeStep::UserImage => "user_image",
            CascadeStep::UserTasks => "user_tasks",
        }
    }
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one branch: number of removed records, or the error.
#[derive(Debug)]
pub struct StepOutcome {
    pub step: CascadeStep,
    pub result: WardResult<u64>,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-branch outcomes of a cascade, in launch order.
#[derive(Debug)]
pub struct CascadeReport {
    target: String,
    steps: Vec<StepOutcome>,
}

impl CascadeReport {
    /// The id of the deleted parent.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// All outcomes, in launch order.
    pub fn steps(&self) -> &[StepOutcome] {
        &self.steps
    }

    /// Returns `true` if every branch succeeded.
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(StepOutcome::is_ok)
    }

    /// Records removed by `step`, if it ran and succeeded.
    pub fn removed(&self, step: CascadeStep) -> Option<u64> {
        self.steps
            .iter()
            .find(|o| o.step == step)
            .and_then(|o| o.result.as_ref().ok().copied())
    }

    /// Total records removed across successful branches.
    pub fn total_removed(&self) -> u64 {
        self.steps
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .sum()
    }

    /// The first failing branch in launch order.
    pub fn first_failure(&self) -> Option<(CascadeStep, &WardError)> {
        self.steps
            .iter()
            .find_map(|o| o.result.as_ref().err().map(|e| (o.step, e)))
    }

    /// Converts the report into an error if any branch failed.
    pub fn into_result(self) -> WardResult<CascadeReport> {
        if self.is_complete() {
            return Ok(self);
        }
        let mut completed = Vec::new();
        let mut failure = None;
        for outcome in self.steps {
            match outcome.result {
                Ok(_) => completed.push(outcome.step.as_str()),
                Err(e) if failure.is_none() => failure = Some((outcome.step, e)),
                Err(_) => {}
            }
        }
        match failure {
            Some((step, source)) => Err(WardError::cascade(step.as_str(), completed, source)),
            None => Err(WardError::store("cascade failed without a recorded error")),
        }
    }
}

// =============================================================================
// CascadeDeleter
// =============================================================================

/// Orchestrates the deletion of records depending on a group or user.
///
/// Holds no state beyond its store handles; every call coordinates only its
/// own branches.
#[derive(Clone)]
pub struct CascadeDeleter {
    users: Arc<dyn UserStore>,
    tasks: Arc<dyn TaskStore>,
    files: Arc<dyn FileStore>,
}

impl CascadeDeleter {
    pub fn new(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            users,
            tasks,
            files,
        }
    }

    /// Deletes every user, task and user-owned file of a group.
    ///
    /// Fails with [`WardError::CascadeFailure`] carrying the first failing
    /// branch. The group record itself is left for the caller to delete.
    pub async fn delete_group_cascade(&self, group_id: &GroupId) -> WardResult<CascadeReport> {
        self.run_group_cascade(group_id).await?.into_result()
    }

    /// Runs the group cascade and returns every branch outcome.
    ///
    /// Only precondition failures are returned as `Err`; branch failures are
    /// recorded in the report.
    pub async fn run_group_cascade(&self, group_id: &GroupId) -> WardResult<CascadeReport> {
        if !group_id.is_valid() {
            return Err(WardError::validation(
                "filter id cannot be empty for mass delete",
            ));
        }

        // Files are resolved from the users before any branch runs, since the
        // user branch removes the records the lookup depends on.
        let members = self
            .users
            .find_many(&UserFilter::in_group(group_id.clone()))
            .await?;
        let file_ids = self.resolve_user_files(&members).await?;

        let files = self.files.clone();
        let users = self.users.clone();
        let tasks = self.tasks.clone();
        let user_filter = UserFilter::in_group(group_id.clone());
        let task_filter = TaskFilter::in_group(group_id.clone());

        let handles = vec![
            spawn_step(CascadeStep::GroupFiles, async move {
                files.delete_many(&file_ids).await
            }),
            spawn_step(CascadeStep::GroupUsers, async move {
                users.delete_many(&user_filter).await
            }),
            spawn_step(CascadeStep::GroupTasks, async move {
                tasks.delete_many(&task_filter).await
            }),
        ];

        let report = collect(group_id.to_string(), handles).await;
        log_report("group", &report);
        Ok(report)
    }

    /// Deletes a user's image file and tasks.
    pub async fn delete_user_cascade(&self, user: &User) -> WardResult<CascadeReport> {
        self.run_user_cascade(user).await?.into_result()
    }

    /// Runs the user cascade and returns every branch outcome.
    pub async fn run_user_cascade(&self, user: &User) -> WardResult<CascadeReport> {
        if !user.id.is_valid() {
            return Err(WardError::missing_fields("user", &["id"]));
        }

        let mut handles = Vec::with_capacity(2);
        if user.image_id.as_ref().is_some_and(FileId::is_valid) {
            let files = self.files.clone();
            let owned = FileFilter::owned_by_user(&user.id);
            handles.push(spawn_step(CascadeStep::UserImage, async move {
                let ids: Vec<FileId> = files
                    .find_many(&owned)
                    .await?
                    .into_iter()
                    .map(|f| f.id)
                    .collect();
                files.delete_many(&ids).await
            }));
        }
        let tasks = self.tasks.clone();
        let task_filter = TaskFilter::owned_by(user.id.clone());
        handles.push(spawn_step(CascadeStep::UserTasks, async move {
            tasks.delete_many(&task_filter).await
        }));

        let report = collect(user.id.to_string(), handles).await;
        log_report("user", &report);
        Ok(report)
    }

    /// Files owned by the given users. A user's `image_id` alone never
    /// selects a file.
    async fn resolve_user_files(&self, users: &[User]) -> WardResult<Vec<FileId>> {
        let mut ids = Vec::new();
        for user in users {
            for file in self.files.find_many(&FileFilter::owned_by_user(&user.id)).await? {
                ids.push(file.id);
            }
        }
        Ok(ids)
    }
}

impl fmt::Debug for CascadeDeleter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CascadeDeleter").finish_non_exhaustive()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn spawn_step<F>(step: CascadeStep, fut: F) -> (CascadeStep, JoinHandle<WardResult<u64>>)
where
    F: Future<Output = WardResult<u64>> + Send + 'static,
{
    (step, tokio::spawn(fut))
}

/// Awaits every branch in launch order, regardless of earlier failures.
async fn collect(
    target: String,
    handles: Vec<(CascadeStep, JoinHandle<WardResult<u64>>)>,
) -> CascadeReport {
    let mut steps = Vec::with_capacity(handles.len());
    for (step, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(WardError::store(format!("cascade branch aborted: {}", e))),
        };
        steps.push(StepOutcome { step, result });
    }
    CascadeReport { target, steps }
}

fn log_report(kind: &str, report: &CascadeReport) {
    match report.first_failure() {
        None => info!(
            kind,
            target = report.target(),
            removed = report.total_removed(),
            "Cascade delete completed"
        ),
        Some((step, error)) => warn!(
            kind,
            target = report.target(),
            step = %step,
            error = %error,
            removed = report.total_removed(),
            "Cascade delete partially failed"
        ),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStores;
    use crate::model::{File, Group, Task};
    use crate::store::{FileStore, TaskStore, UserStore};
    use crate::types::{OwnerType, Role, UserId};
    use chrono::Utc;

    fn deleter(stores: &MemoryStores) -> CascadeDeleter {
        CascadeDeleter::new(stores.users.clone(), stores.tasks.clone(), stores.files.clone())
    }

    #[tokio::test]
    async fn test_group_cascade_rejects_invalid_id() {
        let stores = MemoryStores::new();
        let err = deleter(&stores)
            .delete_group_cascade(&GroupId::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "filter id cannot be empty for mass delete");
    }

    #[tokio::test]
    async fn test_user_cascade_removes_image_and_tasks() {
        let stores = MemoryStores::new();
        let group = Group::new("acme");
        let user = User::new("ann", "ann@acme.io", "h", group.id.clone(), Role::Member);
        let image = stores
            .files
            .create(File::new(OwnerType::User, user.id.as_str(), "me.png", 1), vec![0])
            .await
            .unwrap();
        let user = stores
            .users
            .create(user.with_image(image.id.clone()))
            .await
            .unwrap();
        for name in ["a", "b"] {
            stores
                .tasks
                .create(Task::new(name, Utc::now(), user.id.clone(), group.id.clone()))
                .await
                .unwrap();
        }

        let report = deleter(&stores).delete_user_cascade(&user).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.removed(CascadeStep::UserImage), Some(1));
        assert_eq!(report.removed(CascadeStep::UserTasks), Some(2));

        // Retrying after success removes nothing and still succeeds.
        let again = deleter(&stores).delete_user_cascade(&user).await.unwrap();
        assert_eq!(again.total_removed(), 0);
    }

    #[tokio::test]
    async fn test_user_cascade_spares_file_of_another_owner() {
        let stores = MemoryStores::new();
        let owner = UserId::generate();
        let image = stores
            .files
            .create(File::new(OwnerType::User, owner.as_str(), "theirs.png", 1), vec![0])
            .await
            .unwrap();
        let user = User::new("cy", "cy@acme.io", "h", GroupId::generate(), Role::Admin)
            .with_image(image.id.clone());

        let report = deleter(&stores).delete_user_cascade(&user).await.unwrap();
        assert_eq!(report.removed(CascadeStep::UserImage), Some(0));
        assert!(stores.files.find(&FileFilter::by_id(image.id)).await.is_ok());
    }

    #[tokio::test]
    async fn test_user_without_image_runs_single_branch() {
        let stores = MemoryStores::new();
        let user = User::new("bo", "bo@acme.io", "h", GroupId::generate(), Role::Member);
        let report = deleter(&stores).run_user_cascade(&user).await.unwrap();
        assert_eq!(report.steps().len(), 1);
        assert_eq!(report.steps()[0].step, CascadeStep::UserTasks);
    }

    #[test]
    fn test_report_into_result_keeps_first_failure() {
        let report = CascadeReport {
            target: "g".into(),
            steps: vec![
                StepOutcome {
                    step: CascadeStep::GroupFiles,
                    result: Ok(1),
                },
                StepOutcome {
                    step: CascadeStep::GroupUsers,
                    result: Err(WardError::store("users down")),
                },
                StepOutcome {
                    step: CascadeStep::GroupTasks,
                    result: Err(WardError::store("tasks down")),
                },
            ],
        };
        match report.into_result() {
            Err(WardError::CascadeFailure {
                step,
                completed,
                source,
            }) => {
                assert_eq!(step, "group_users");
                assert_eq!(completed, vec!["group_files"]);
                assert!(source.to_string().contains("users down"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
