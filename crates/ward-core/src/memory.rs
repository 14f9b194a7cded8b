// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store implementations.
//!
//! These back the default binary and the test suite. Records are kept in
//! `BTreeMap`s keyed by id behind `parking_lot::RwLock`; since ids are
//! time-ordered, iteration follows insertion order.
//!
//! # Example
//!
//! ```rust,ignore
//! use ward_core::memory::MemoryStores;
//!
//! let stores = MemoryStores::new();
//! let group = stores.groups.create(Group::new("acme")).await?;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{WardError, WardResult};
use crate::model::{
    File, FileFilter, Group, GroupFilter, RevocationEntry, Task, TaskFilter, User, UserFilter,
};
use crate::store::{BlobStore, FileStore, GroupStore, RevocationStore, TaskStore, UserStore};
use crate::types::{FileId, GroupId, TaskId, UserId};

const EMPTY_MASS_DELETE: &str = "filter id cannot be empty for mass delete";

// =============================================================================
// Table
// =============================================================================

/// Why a guarded table write was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refused {
    KeyTaken,
    Missing,
    Clash,
}

/// A locked ordered map shared by the entity stores.
#[derive(Debug)]
struct Table<K, V> {
    rows: RwLock<BTreeMap<K, V>>,
}

impl<K: Ord + Clone, V: Clone> Table<K, V> {
    fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    fn first(&self, pred: impl Fn(&V) -> bool) -> Option<V> {
        self.rows.read().values().find(|v| pred(v)).cloned()
    }

    fn all(&self, pred: impl Fn(&V) -> bool) -> Vec<V> {
        self.rows.read().values().filter(|v| pred(v)).cloned().collect()
    }

    /// Inserts under one write guard, refusing a taken key or a row that
    /// `clashes` with the new value.
    fn insert_new(&self, key: K, value: V, clashes: impl Fn(&V) -> bool) -> Result<(), Refused> {
        let mut rows = self.rows.write();
        if rows.contains_key(&key) {
            return Err(Refused::KeyTaken);
        }
        if rows.values().any(|v| clashes(v)) {
            return Err(Refused::Clash);
        }
        rows.insert(key, value);
        Ok(())
    }

    /// Replaces an existing row. Rows other than `key` are checked against
    /// `clashes` under the same guard.
    fn replace(&self, key: &K, value: V, clashes: impl Fn(&V) -> bool) -> Result<(), Refused> {
        let mut rows = self.rows.write();
        if !rows.contains_key(key) {
            return Err(Refused::Missing);
        }
        if rows.iter().any(|(k, v)| k != key && clashes(v)) {
            return Err(Refused::Clash);
        }
        rows.insert(key.clone(), value);
        Ok(())
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.rows.write().remove(key)
    }

    fn remove_where(&self, pred: impl Fn(&V) -> bool) -> u64 {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|_, v| !pred(v));
        (before - rows.len()) as u64
    }

    fn len(&self) -> usize {
        self.rows.read().len()
    }
}

// =============================================================================
// Users
// =============================================================================

/// In-memory [`UserStore`]. Emails are unique.
#[derive(Debug)]
pub struct MemoryUserStore {
    table: Table<UserId, User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find(&self, filter: &UserFilter) -> WardResult<User> {
        self.table
            .first(|u| filter.matches(u))
            .ok_or_else(|| WardError::not_found("user", describe_user_filter(filter)))
    }

    async fn find_many(&self, filter: &UserFilter) -> WardResult<Vec<User>> {
        Ok(self.table.all(|u| filter.matches(u)))
    }

    async fn create(&self, user: User) -> WardResult<User> {
        user.validate_for_create()?;
        match self
            .table
            .insert_new(user.id.clone(), user.clone(), |u| u.email == user.email)
        {
            Ok(()) => {}
            Err(Refused::Clash) => return Err(email_taken(&user.email)),
            Err(_) => {
                return Err(WardError::consistency(format!("user {} already exists", user.id)))
            }
        }
        debug!(user_id = %user.id, "User stored");
        Ok(user)
    }

    async fn update(&self, user: User) -> WardResult<User> {
        match self
            .table
            .replace(&user.id, user.clone(), |u| u.email == user.email)
        {
            Ok(()) => Ok(user),
            Err(Refused::Clash) => Err(email_taken(&user.email)),
            Err(_) => Err(WardError::not_found("user", user.id.as_str())),
        }
    }

    async fn delete(&self, id: &UserId) -> WardResult<Option<User>> {
        Ok(self.table.remove(id))
    }

    async fn delete_many(&self, filter: &UserFilter) -> WardResult<u64> {
        if filter.is_empty() {
            return Err(WardError::validation(EMPTY_MASS_DELETE));
        }
        Ok(self.table.remove_where(|u| filter.matches(u)))
    }
}

fn email_taken(email: &str) -> WardError {
    WardError::consistency(format!("email {} is already registered", email))
}

fn describe_user_filter(filter: &UserFilter) -> String {
    filter
        .id
        .as_ref()
        .map(|id| id.to_string())
        .or_else(|| filter.email.clone())
        .unwrap_or_else(|| "filter".to_string())
}

// =============================================================================
// Groups
// =============================================================================

/// In-memory [`GroupStore`].
#[derive(Debug)]
pub struct MemoryGroupStore {
    table: Table<GroupId, Group>,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }
}

impl Default for MemoryGroupStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn find(&self, filter: &GroupFilter) -> WardResult<Group> {
        self.table.first(|g| filter.matches(g)).ok_or_else(|| {
            let id = filter
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "filter".to_string());
            WardError::not_found("group", id)
        })
    }

    async fn find_many(&self, filter: &GroupFilter) -> WardResult<Vec<Group>> {
        Ok(self.table.all(|g| filter.matches(g)))
    }

    async fn create(&self, group: Group) -> WardResult<Group> {
        group.validate_for_create()?;
        let root_admin = group.root_admin;
        match self
            .table
            .insert_new(group.id.clone(), group.clone(), |g| root_admin && g.root_admin)
        {
            Ok(()) => {}
            Err(Refused::Clash) => {
                return Err(WardError::consistency("a root admin group already exists"))
            }
            Err(_) => {
                return Err(WardError::consistency(format!("group {} already exists", group.id)))
            }
        }
        debug!(group_id = %group.id, "Group stored");
        Ok(group)
    }

    async fn update(&self, group: Group) -> WardResult<Group> {
        if self.table.replace(&group.id, group.clone(), |_| false).is_ok() {
            Ok(group)
        } else {
            Err(WardError::not_found("group", group.id.as_str()))
        }
    }

    async fn delete(&self, id: &GroupId) -> WardResult<Option<Group>> {
        Ok(self.table.remove(id))
    }

    async fn delete_many(&self, filter: &GroupFilter) -> WardResult<u64> {
        if *filter == GroupFilter::default() {
            return Err(WardError::validation(EMPTY_MASS_DELETE));
        }
        Ok(self.table.remove_where(|g| filter.matches(g)))
    }

    async fn count(&self) -> WardResult<u64> {
        Ok(self.table.len() as u64)
    }
}

// =============================================================================
// Tasks
// =============================================================================

/// In-memory [`TaskStore`].
#[derive(Debug)]
pub struct MemoryTaskStore {
    table: Table<TaskId, Task>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn find(&self, filter: &TaskFilter) -> WardResult<Task> {
        self.table.first(|t| filter.matches(t)).ok_or_else(|| {
            let id = filter
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "filter".to_string());
            WardError::not_found("task", id)
        })
    }

    async fn find_many(&self, filter: &TaskFilter) -> WardResult<Vec<Task>> {
        Ok(self.table.all(|t| filter.matches(t)))
    }

    async fn create(&self, task: Task) -> WardResult<Task> {
        task.validate_for_create()?;
        if self.table.insert_new(task.id.clone(), task.clone(), |_| false).is_err() {
            return Err(WardError::consistency(format!("task {} already exists", task.id)));
        }
        Ok(task)
    }

    async fn update(&self, task: Task) -> WardResult<Task> {
        if self.table.replace(&task.id, task.clone(), |_| false).is_ok() {
            Ok(task)
        } else {
            Err(WardError::not_found("task", task.id.as_str()))
        }
    }

    async fn delete(&self, id: &TaskId) -> WardResult<Option<Task>> {
        Ok(self.table.remove(id))
    }

    async fn delete_many(&self, filter: &TaskFilter) -> WardResult<u64> {
        if filter.is_empty() {
            return Err(WardError::validation(EMPTY_MASS_DELETE));
        }
        Ok(self.table.remove_where(|t| filter.matches(t)))
    }
}

// =============================================================================
// Blobs
// =============================================================================

/// In-memory [`BlobStore`], one map per bucket.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    buckets: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of blobs across buckets.
    pub fn blob_count(&self) -> usize {
        self.buckets.read().values().map(HashMap::len).sum()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, bucket: &str, blob_id: &str, content: Vec<u8>) -> WardResult<()> {
        self.buckets
            .write()
            .entry(bucket.to_string())
            .or_default()
            .insert(blob_id.to_string(), content);
        Ok(())
    }

    async fn get(&self, bucket: &str, blob_id: &str) -> WardResult<Option<Vec<u8>>> {
        Ok(self
            .buckets
            .read()
            .get(bucket)
            .and_then(|b| b.get(blob_id))
            .cloned())
    }

    async fn remove(&self, bucket: &str, blob_id: &str) -> WardResult<bool> {
        let mut buckets = self.buckets.write();
        let Some(blobs) = buckets.get_mut(bucket) else {
            return Ok(false);
        };
        let removed = blobs.remove(blob_id).is_some();
        if blobs.is_empty() {
            buckets.remove(bucket);
        }
        Ok(removed)
    }
}

// =============================================================================
// Files
// =============================================================================

/// In-memory [`FileStore`] that keeps content in a [`BlobStore`].
pub struct MemoryFileStore {
    table: Table<FileId, File>,
    blobs: Arc<dyn BlobStore>,
}

impl MemoryFileStore {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            table: Table::new(),
            blobs,
        }
    }

    async fn drop_blob(&self, file: &File) -> WardResult<()> {
        self.blobs.remove(&file.bucket_name, &file.blob_id).await?;
        Ok(())
    }
}

impl std::fmt::Debug for MemoryFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryFileStore")
            .field("files", &self.table.len())
            .finish()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn find(&self, filter: &FileFilter) -> WardResult<File> {
        self.table.first(|f| filter.matches(f)).ok_or_else(|| {
            let id = filter
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "filter".to_string());
            WardError::not_found("file", id)
        })
    }

    async fn find_many(&self, filter: &FileFilter) -> WardResult<Vec<File>> {
        Ok(self.table.all(|f| filter.matches(f)))
    }

    async fn create(&self, file: File, content: Vec<u8>) -> WardResult<File> {
        self.blobs
            .put(&file.bucket_name, &file.blob_id, content)
            .await?;
        if self.table.insert_new(file.id.clone(), file.clone(), |_| false).is_err() {
            return Err(WardError::consistency(format!("file {} already exists", file.id)));
        }
        Ok(file)
    }

    async fn delete(&self, id: &FileId) -> WardResult<Option<File>> {
        let removed = self.table.remove(id);
        if let Some(file) = &removed {
            self.drop_blob(file).await?;
        }
        Ok(removed)
    }

    async fn delete_many(&self, ids: &[FileId]) -> WardResult<u64> {
        let mut removed = 0;
        for id in ids {
            if self.delete(id).await?.is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

// =============================================================================
// Revocations
// =============================================================================

/// In-memory [`RevocationStore`] backed by a `DashMap`.
#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    entries: DashMap<String, DateTime<Utc>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn insert(&self, entry: RevocationEntry) -> WardResult<()> {
        self.entries
            .entry(entry.signature)
            .and_modify(|exp| *exp = (*exp).max(entry.expires_at))
            .or_insert(entry.expires_at);
        Ok(())
    }

    async fn contains(&self, signature: &str) -> WardResult<bool> {
        Ok(self.entries.contains_key(signature))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> WardResult<u64> {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        Ok(before.saturating_sub(self.entries.len()) as u64)
    }

    async fn len(&self) -> WardResult<usize> {
        Ok(self.entries.len())
    }
}

// =============================================================================
// Bundle
// =============================================================================

/// One in-memory instance of every store, wired together.
#[derive(Clone)]
pub struct MemoryStores {
    pub users: Arc<MemoryUserStore>,
    pub groups: Arc<MemoryGroupStore>,
    pub tasks: Arc<MemoryTaskStore>,
    pub files: Arc<MemoryFileStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub revocations: Arc<MemoryRevocationStore>,
}

impl MemoryStores {
    pub fn new() -> Self {
        let blobs = Arc::new(MemoryBlobStore::new());
        Self {
            users: Arc::new(MemoryUserStore::new()),
            groups: Arc::new(MemoryGroupStore::new()),
            tasks: Arc::new(MemoryTaskStore::new()),
            files: Arc::new(MemoryFileStore::new(blobs.clone())),
            blobs,
            revocations: Arc::new(MemoryRevocationStore::new()),
        }
    }
}

impl Default for MemoryStores {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OwnerType, Role};
    use chrono::Duration;

    fn user_in(group: &GroupId, email: &str) -> User {
        User::new(email, email, "hash", group.clone(), Role::Member)
    }

    #[tokio::test]
    async fn test_user_store_crud() {
        let store = MemoryUserStore::new();
        let group = GroupId::generate();
        let user = store.create(user_in(&group, "a@x.io")).await.unwrap();

        let found = store.find(&UserFilter::by_id(user.id.clone())).await.unwrap();
        assert_eq!(found.email, "a@x.io");

        assert!(store.create(user_in(&group, "a@x.io")).await.is_err());

        assert!(store.delete(&user.id).await.unwrap().is_some());
        assert!(store.delete(&user.id).await.unwrap().is_none());
        assert!(matches!(
            store.find(&UserFilter::by_id(user.id)).await,
            Err(WardError::NotFound { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_keep_email_unique() {
        let store = Arc::new(MemoryUserStore::new());
        let group = GroupId::generate();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let user = user_in(&group, "race@x.io");
                tokio::spawn(async move { store.create(user).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let store = MemoryUserStore::new();
        let group = GroupId::generate();
        store.create(user_in(&group, "a@x.io")).await.unwrap();
        let mut b = store.create(user_in(&group, "b@x.io")).await.unwrap();

        b.email = "a@x.io".to_string();
        assert!(matches!(
            store.update(b.clone()).await,
            Err(WardError::Consistency { .. })
        ));

        b.email = "b@x.io".to_string();
        assert!(store.update(b).await.is_ok());
    }

    #[tokio::test]
    async fn test_mass_delete_rejects_empty_filter() {
        let users = MemoryUserStore::new();
        let tasks = MemoryTaskStore::new();
        assert!(users.delete_many(&UserFilter::default()).await.is_err());
        assert!(tasks.delete_many(&TaskFilter::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_many_is_idempotent() {
        let store = MemoryUserStore::new();
        let group = GroupId::generate();
        store.create(user_in(&group, "a@x.io")).await.unwrap();
        store.create(user_in(&group, "b@x.io")).await.unwrap();

        let filter = UserFilter::in_group(group);
        assert_eq!(store.delete_many(&filter).await.unwrap(), 2);
        assert_eq!(store.delete_many(&filter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_single_root_group() {
        let store = MemoryGroupStore::new();
        store.create(Group::root("root")).await.unwrap();
        assert!(store.create(Group::root("second")).await.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_file_delete_drops_blob() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let files = MemoryFileStore::new(blobs.clone());
        let owner = UserId::generate();
        let file = files
            .create(File::new(OwnerType::User, owner.as_str(), "a.png", 3), vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(blobs.blob_count(), 1);

        assert_eq!(files.delete_many(&[file.id.clone(), FileId::generate()]).await.unwrap(), 1);
        assert_eq!(blobs.blob_count(), 0);
        assert!(files.delete(&file.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revocation_purge() {
        let store = MemoryRevocationStore::new();
        let now = Utc::now();
        store
            .insert(RevocationEntry::new("old", now - Duration::minutes(1)))
            .await
            .unwrap();
        store
            .insert(RevocationEntry::new("live", now + Duration::hours(1)))
            .await
            .unwrap();
        store
            .insert(RevocationEntry::new("live", now + Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(store.len().await.unwrap(), 2);
        assert_eq!(store.purge_expired(now).await.unwrap(), 1);
        assert!(store.contains("live").await.unwrap());
        assert!(!store.contains("old").await.unwrap());
    }
}
