// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Store contracts.
//!
//! Each entity lives behind an async store trait. The core never assumes a
//! particular backend; [`crate::memory`] ships in-memory implementations.
//!
//! # Deletion Semantics
//!
//! Deleting a record that is already gone is a success: `delete` returns
//! `Ok(None)` and `delete_many` counts only what it removed. Cascading deletes
//! rely on this to be retried as a whole after a partial failure.
//!
//! # Example
//!
//! ```rust,ignore
//! use ward_core::store::UserStore;
//!
//! let users = store.find_many(&UserFilter::in_group(group_id)).await?;
//! let removed = store.delete_many(&UserFilter::in_group(group_id)).await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::WardResult;
use crate::model::{
    File, FileFilter, Group, GroupFilter, RevocationEntry, Task, TaskFilter, User, UserFilter,
};
use crate::types::{FileId, GroupId, TaskId, UserId};

// =============================================================================
// Entity Stores
// =============================================================================

/// Persistence for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns the first user matching `filter`, or `NotFound`.
    async fn find(&self, filter: &UserFilter) -> WardResult<User>;

    /// Returns every user matching `filter`.
    async fn find_many(&self, filter: &UserFilter) -> WardResult<Vec<User>>;

    /// Inserts a new user. Fails on duplicate id or email.
    async fn create(&self, user: User) -> WardResult<User>;

    /// Replaces an existing user, keyed by id.
    async fn update(&self, user: User) -> WardResult<User>;

    /// Removes a user. Returns `None` if it was already gone.
    async fn delete(&self, id: &UserId) -> WardResult<Option<User>>;

    /// Removes every user matching `filter`. An empty filter is rejected.
    async fn delete_many(&self, filter: &UserFilter) -> WardResult<u64>;
}

/// Persistence for groups.
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn find(&self, filter: &GroupFilter) -> WardResult<Group>;

    async fn find_many(&self, filter: &GroupFilter) -> WardResult<Vec<Group>>;

    async fn create(&self, group: Group) -> WardResult<Group>;

    async fn update(&self, group: Group) -> WardResult<Group>;

    async fn delete(&self, id: &GroupId) -> WardResult<Option<Group>>;

    /// Removes every group matching `filter`. An empty filter is rejected.
    async fn delete_many(&self, filter: &GroupFilter) -> WardResult<u64>;

    /// Returns the number of stored groups.
    async fn count(&self) -> WardResult<u64>;
}

/// Persistence for tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find(&self, filter: &TaskFilter) -> WardResult<Task>;

    async fn find_many(&self, filter: &TaskFilter) -> WardResult<Vec<Task>>;

    async fn create(&self, task: Task) -> WardResult<Task>;

    async fn update(&self, task: Task) -> WardResult<Task>;

    async fn delete(&self, id: &TaskId) -> WardResult<Option<Task>>;

    /// Removes every task matching `filter`. An empty filter is rejected.
    async fn delete_many(&self, filter: &TaskFilter) -> WardResult<u64>;
}

/// Persistence for file metadata. Implementations also drop the blob.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn find(&self, filter: &FileFilter) -> WardResult<File>;

    async fn find_many(&self, filter: &FileFilter) -> WardResult<Vec<File>>;

    async fn create(&self, file: File, content: Vec<u8>) -> WardResult<File>;

    async fn delete(&self, id: &FileId) -> WardResult<Option<File>>;

    /// Removes every listed file. Missing ids are skipped.
    async fn delete_many(&self, ids: &[FileId]) -> WardResult<u64>;
}

// =============================================================================
// Blob Store
// =============================================================================

/// Opaque binary content keyed by `(bucket, blob_id)`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, bucket: &str, blob_id: &str, content: Vec<u8>) -> WardResult<()>;

    async fn get(&self, bucket: &str, blob_id: &str) -> WardResult<Option<Vec<u8>>>;

    /// Removes a blob. Returns `false` if it was already gone.
    async fn remove(&self, bucket: &str, blob_id: &str) -> WardResult<bool>;
}

// =============================================================================
// Revocation Store
// =============================================================================

/// Registry of revoked credentials.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Records a revocation. Inserting the same signature twice is a no-op.
    async fn insert(&self, entry: RevocationEntry) -> WardResult<()>;

    /// Returns `true` if `signature` has been revoked.
    async fn contains(&self, signature: &str) -> WardResult<bool>;

    /// Drops entries whose token expired before `now`. Returns how many.
    async fn purge_expired(&self, now: DateTime<Utc>) -> WardResult<u64>;

    /// Number of live entries.
    async fn len(&self) -> WardResult<usize>;
}
