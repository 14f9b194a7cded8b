// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Store wrappers that delegate to the in-memory stores but can be told to
//! fail. Reads and writes are switched separately, and every call is counted.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ward_api::Stores;
use ward_core::{
    File, FileFilter, FileId, FileStore, MemoryFileStore, MemoryRevocationStore, MemoryStores,
    MemoryTaskStore, MemoryUserStore, RevocationEntry, RevocationStore, Task, TaskFilter, TaskId,
    TaskStore, User, UserFilter, UserId, UserStore, WardError, WardResult,
};

// =============================================================================
// Fail Switch
// =============================================================================

/// Failure switches and a call counter shared by every mock store.
#[derive(Debug, Default)]
pub struct FailSwitch {
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_next_write: AtomicBool,
    calls: AtomicU64,
}

impl FailSwitch {
    /// Makes every read fail until reset.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every write fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes only the next write fail.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// Clears every switch.
    pub fn reset(&self) {
        self.set_fail_reads(false);
        self.set_fail_writes(false);
        self.fail_next_write.store(false, Ordering::SeqCst);
    }

    /// Number of store calls seen so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn read(&self, op: &str) -> WardResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected(op));
        }
        Ok(())
    }

    fn write(&self, op: &str) -> WardResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst)
            || self.fail_next_write.swap(false, Ordering::SeqCst)
        {
            return Err(injected(op));
        }
        Ok(())
    }
}

fn injected(op: &str) -> WardError {
    WardError::store_unavailable(format!("injected failure in {}", op))
}

// =============================================================================
// Mock Stores
// =============================================================================

/// User store with injectable failures.
#[derive(Debug)]
pub struct MockUserStore {
    inner: Arc<MemoryUserStore>,
    pub switch: FailSwitch,
}

impl MockUserStore {
    pub fn new(inner: Arc<MemoryUserStore>) -> Self {
        Self {
            inner,
            switch: FailSwitch::default(),
        }
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn find(&self, filter: &UserFilter) -> WardResult<User> {
        self.switch.read("users.find")?;
        self.inner.find(filter).await
    }

    async fn find_many(&self, filter: &UserFilter) -> WardResult<Vec<User>> {
        self.switch.read("users.find_many")?;
        self.inner.find_many(filter).await
    }

    async fn create(&self, user: User) -> WardResult<User> {
        self.switch.write("users.create")?;
        self.inner.create(user).await
    }

    async fn update(&self, user: User) -> WardResult<User> {
        self.switch.write("users.update")?;
        self.inner.update(user).await
    }

    async fn delete(&self, id: &UserId) -> WardResult<Option<User>> {
        self.switch.write("users.delete")?;
        self.inner.delete(id).await
    }

    async fn delete_many(&self, filter: &UserFilter) -> WardResult<u64> {
        self.switch.write("users.delete_many")?;
        self.inner.delete_many(filter).await
    }
}

/// Task store with injectable failures.
#[derive(Debug)]
pub struct MockTaskStore {
    inner: Arc<MemoryTaskStore>,
    pub switch: FailSwitch,
}

impl MockTaskStore {
    pub fn new(inner: Arc<MemoryTaskStore>) -> Self {
        Self {
            inner,
            switch: FailSwitch::default(),
        }
    }
}

#[async_trait]
impl TaskStore for MockTaskStore {
    async fn find(&self, filter: &TaskFilter) -> WardResult<Task> {
        self.switch.read("tasks.find")?;
        self.inner.find(filter).await
    }

    async fn find_many(&self, filter: &TaskFilter) -> WardResult<Vec<Task>> {
        self.switch.read("tasks.find_many")?;
        self.inner.find_many(filter).await
    }

    async fn create(&self, task: Task) -> WardResult<Task> {
        self.switch.write("tasks.create")?;
        self.inner.create(task).await
    }

    async fn update(&self, task: Task) -> WardResult<Task> {
        self.switch.write("tasks.update")?;
        self.inner.update(task).await
    }

    async fn delete(&self, id: &TaskId) -> WardResult<Option<Task>> {
        self.switch.write("tasks.delete")?;
        self.inner.delete(id).await
    }

    async fn delete_many(&self, filter: &TaskFilter) -> WardResult<u64> {
        self.switch.write("tasks.delete_many")?;
        self.inner.delete_many(filter).await
    }
}

/// File store with injectable failures.
#[derive(Debug)]
pub struct MockFileStore {
    inner: Arc<MemoryFileStore>,
    pub switch: FailSwitch,
}

impl MockFileStore {
    pub fn new(inner: Arc<MemoryFileStore>) -> Self {
        Self {
            inner,
            switch: FailSwitch::default(),
        }
    }
}

#[async_trait]
impl FileStore for MockFileStore {
    async fn find(&self, filter: &FileFilter) -> WardResult<File> {
        self.switch.read("files.find")?;
        self.inner.find(filter).await
    }

    async fn find_many(&self, filter: &FileFilter) -> WardResult<Vec<File>> {
        self.switch.read("files.find_many")?;
        self.inner.find_many(filter).await
    }

    async fn create(&self, file: File, content: Vec<u8>) -> WardResult<File> {
        self.switch.write("files.create")?;
        self.inner.create(file, content).await
    }

    async fn delete(&self, id: &FileId) -> WardResult<Option<File>> {
        self.switch.write("files.delete")?;
        self.inner.delete(id).await
    }

    async fn delete_many(&self, ids: &[FileId]) -> WardResult<u64> {
        self.switch.write("files.delete_many")?;
        self.inner.delete_many(ids).await
    }
}

/// Revocation store with injectable failures.
#[derive(Debug)]
pub struct MockRevocationStore {
    inner: Arc<MemoryRevocationStore>,
    pub switch: FailSwitch,
}

impl MockRevocationStore {
    pub fn new(inner: Arc<MemoryRevocationStore>) -> Self {
        Self {
            inner,
            switch: FailSwitch::default(),
        }
    }
}

#[async_trait]
impl RevocationStore for MockRevocationStore {
    async fn insert(&self, entry: RevocationEntry) -> WardResult<()> {
        self.switch.write("revocations.insert")?;
        self.inner.insert(entry).await
    }

    async fn contains(&self, signature: &str) -> WardResult<bool> {
        self.switch.read("revocations.contains")?;
        self.inner.contains(signature).await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> WardResult<u64> {
        self.switch.write("revocations.purge_expired")?;
        self.inner.purge_expired(now).await
    }

    async fn len(&self) -> WardResult<usize> {
        self.switch.read("revocations.len")?;
        self.inner.len().await
    }
}

// =============================================================================
// Bundle
// =============================================================================

/// The in-memory stores with mock wrappers in front of them.
///
/// Seeding through `memory` bypasses the switches; everything handed out by
/// [`MockStores::stores`] goes through them. Groups are never wrapped.
#[derive(Clone)]
pub struct MockStores {
    pub memory: MemoryStores,
    pub users: Arc<MockUserStore>,
    pub tasks: Arc<MockTaskStore>,
    pub files: Arc<MockFileStore>,
    pub revocations: Arc<MockRevocationStore>,
}

impl MockStores {
    pub fn new() -> Self {
        let memory = MemoryStores::new();
        Self {
            users: Arc::new(MockUserStore::new(memory.users.clone())),
            tasks: Arc::new(MockTaskStore::new(memory.tasks.clone())),
            files: Arc::new(MockFileStore::new(memory.files.clone())),
            revocations: Arc::new(MockRevocationStore::new(memory.revocations.clone())),
            memory,
        }
    }

    /// Store handles for the API, routed through the mocks.
    pub fn stores(&self) -> Stores {
        Stores {
            users: self.users.clone(),
            groups: self.memory.groups.clone(),
            tasks: self.tasks.clone(),
            files: self.files.clone(),
            revocations: self.revocations.clone(),
        }
    }

    /// Clears every failure switch.
    pub fn reset(&self) {
        self.users.switch.reset();
        self.tasks.switch.reset();
        self.files.switch.reset();
        self.revocations.switch.reset();
    }
}

impl Default for MockStores {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ward_core::{GroupId, Role};

    #[tokio::test]
    async fn test_switch_fails_reads_until_reset() {
        let mocks = MockStores::new();
        let user = User::new("u", "u@x.io", "h", GroupId::generate(), Role::Member);
        mocks.users.create(user.clone()).await.unwrap();

        mocks.users.switch.set_fail_reads(true);
        let err = mocks.users.find(&UserFilter::by_id(user.id.clone())).await.unwrap_err();
        assert!(err.is_retryable());

        mocks.reset();
        assert!(mocks.users.find(&UserFilter::by_id(user.id)).await.is_ok());
        assert_eq!(mocks.users.switch.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fail_next_write_is_one_shot() {
        let mocks = MockStores::new();
        mocks.tasks.switch.fail_next_write();
        let filter = TaskFilter::in_group(GroupId::generate());
        assert!(mocks.tasks.delete_many(&filter).await.is_err());
        assert_eq!(mocks.tasks.delete_many(&filter).await.unwrap(), 0);
    }
}
