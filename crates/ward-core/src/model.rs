// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Entity model.
//!
//! A [`Group`] owns [`User`]s; users own [`Task`]s and [`File`]s. Each entity
//! comes with a filter type consumed by the store traits and, where the
//! entity is mutable, a patch type that merges partial updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{WardError, WardResult};
use crate::types::{FileId, GroupId, OwnerType, Role, TaskId, TaskStatus, UserId};

// =============================================================================
// Group
// =============================================================================

/// A tenant. Exactly one group carries `root_admin = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub root_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Group {
    /// Creates a regular group with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: GroupId::generate(),
            name: name.into(),
            root_admin: false,
            created_at: now,
            last_modified: now,
            deleted_at: None,
        }
    }

    /// Creates the root-admin group.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            root_admin: true,
            ..Self::new(name)
        }
    }

    /// Validates a group before it is created.
    pub fn validate_for_create(&self) -> WardResult<()> {
        if self.name.trim().is_empty() {
            return Err(WardError::missing_fields("group", &["name"]));
        }
        Ok(())
    }
}

/// Partial update of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GroupPatch {
    pub name: Option<String>,
}

impl GroupPatch {
    /// Merges the non-empty fields into `group`.
    pub fn apply(&self, group: &mut Group) {
        if let Some(name) = non_empty(&self.name) {
            group.name = name.to_string();
        }
        group.last_modified = Utc::now();
    }
}

/// Group query filter. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFilter {
    pub id: Option<GroupId>,
    pub name: Option<String>,
    pub root_admin: Option<bool>,
}

impl GroupFilter {
    /// Filter selecting a single group.
    pub fn by_id(id: GroupId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// Returns `true` if the group satisfies every set field.
    pub fn matches(&self, group: &Group) -> bool {
        self.id.as_ref().is_none_or(|id| *id == group.id)
            && self.name.as_ref().is_none_or(|name| *name == group.name)
            && self.root_admin.is_none_or(|root| root == group.root_admin)
    }
}

// =============================================================================
// User
// =============================================================================

/// A group member. `role == Root` only within the root-admin group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub group_id: GroupId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<FileId>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a user with a fresh id.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        group_id: GroupId,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            username: username.into(),
            password_hash: password_hash.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: email.into(),
            role,
            group_id,
            image_id: None,
            created_at: now,
            last_modified: now,
            deleted_at: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// Sets the profile image.
    pub fn with_image(mut self, image_id: FileId) -> Self {
        self.image_id = Some(image_id);
        self
    }

    /// Returns `true` if the user holds root authority.
    #[inline]
    pub fn is_root_admin(&self) -> bool {
        self.role.is_root()
    }

    /// Validates a user before it is created.
    pub fn validate_for_create(&self) -> WardResult<()> {
        let mut missing = Vec::new();
        if self.username.trim().is_empty() {
            missing.push("username");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if self.password_hash.is_empty() {
            missing.push("password");
        }
        if !self.group_id.is_valid() {
            missing.push("group_id");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(WardError::missing_fields("user", &missing))
        }
    }

    /// Checks the root role against the owning group.
    pub fn check_group(&self, group: &Group) -> WardResult<()> {
        if self.group_id != group.id {
            return Err(WardError::consistency("user is not in the given group"));
        }
        if self.role.is_root() && !group.root_admin {
            return Err(WardError::consistency(
                "root role requires the root admin group",
            ));
        }
        Ok(())
    }
}

/// Partial update of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub group_id: Option<GroupId>,
    /// Set only by server-side flows; never taken from a request body.
    #[serde(skip_deserializing)]
    pub image_id: Option<FileId>,
}

impl UserPatch {
    /// Merges the non-empty fields into `user`.
    pub fn apply(&self, user: &mut User) {
        if let Some(v) = non_empty(&self.username) {
            user.username = v.to_string();
        }
        if let Some(v) = non_empty(&self.first_name) {
            user.first_name = v.to_string();
        }
        if let Some(v) = non_empty(&self.last_name) {
            user.last_name = v.to_string();
        }
        if let Some(v) = non_empty(&self.email) {
            user.email = v.to_string();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(group_id) = self.group_id.as_ref().filter(|id| id.is_valid()) {
            user.group_id = group_id.clone();
        }
        if let Some(image_id) = self.image_id.as_ref().filter(|id| id.is_valid()) {
            user.image_id = Some(image_id.clone());
        }
        user.last_modified = Utc::now();
    }
}

/// User query filter. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub id: Option<UserId>,
    pub group_id: Option<GroupId>,
    pub email: Option<String>,
    pub username: Option<String>,
}

impl UserFilter {
    /// Filter selecting a single user.
    pub fn by_id(id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// Filter selecting every user of a group.
    pub fn in_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Default::default()
        }
    }

    /// Filter selecting a user by email.
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `true` if the user satisfies every set field.
    pub fn matches(&self, user: &User) -> bool {
        self.id.as_ref().is_none_or(|id| *id == user.id)
            && self.group_id.as_ref().is_none_or(|g| *g == user.group_id)
            && self.email.as_ref().is_none_or(|e| *e == user.email)
            && self.username.as_ref().is_none_or(|u| *u == user.username)
    }
}

// =============================================================================
// Task
// =============================================================================

/// A unit of work owned by a user. Its group always equals its user's group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub status: TaskStatus,
    pub due: DateTime<Utc>,
    pub description: String,
    pub user_id: UserId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a not-started task owned by `user_id`.
    pub fn new(
        name: impl Into<String>,
        due: DateTime<Utc>,
        user_id: UserId,
        group_id: GroupId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::generate(),
            name: name.into(),
            status: TaskStatus::NotStarted,
            due,
            description: String::new(),
            user_id,
            group_id,
            created_at: now,
            last_modified: now,
            deleted_at: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Validates a task before it is created.
    pub fn validate_for_create(&self) -> WardResult<()> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if !self.user_id.is_valid() {
            missing.push("user_id");
        }
        if !self.group_id.is_valid() {
            missing.push("group_id");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(WardError::missing_fields("task", &missing))
        }
    }

    /// Checks that the owning user belongs to the task's group.
    pub fn check_owner(&self, owner: &User) -> WardResult<()> {
        if owner.id != self.user_id {
            return Err(WardError::consistency("task user does not match"));
        }
        if owner.group_id != self.group_id {
            return Err(WardError::consistency("task user is not in task group"));
        }
        Ok(())
    }
}

/// Partial update of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due: Option<DateTime<Utc>>,
    pub user_id: Option<UserId>,
    pub group_id: Option<GroupId>,
}

impl TaskPatch {
    /// Merges the non-empty fields into `task`.
    pub fn apply(&self, task: &mut Task) {
        if let Some(v) = non_empty(&self.name) {
            task.name = v.to_string();
        }
        if let Some(v) = non_empty(&self.description) {
            task.description = v.to_string();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(due) = self.due {
            task.due = due;
        }
        if let Some(user_id) = self.user_id.as_ref().filter(|id| id.is_valid()) {
            task.user_id = user_id.clone();
        }
        if let Some(group_id) = self.group_id.as_ref().filter(|id| id.is_valid()) {
            task.group_id = group_id.clone();
        }
        task.last_modified = Utc::now();
    }
}

/// Task query filter. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub id: Option<TaskId>,
    pub user_id: Option<UserId>,
    pub group_id: Option<GroupId>,
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    /// Filter selecting a single task.
    pub fn by_id(id: TaskId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// Filter selecting every task of a group.
    pub fn in_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Default::default()
        }
    }

    /// Filter selecting every task of a user.
    pub fn owned_by(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `true` if the task satisfies every set field.
    pub fn matches(&self, task: &Task) -> bool {
        self.id.as_ref().is_none_or(|id| *id == task.id)
            && self.user_id.as_ref().is_none_or(|u| *u == task.user_id)
            && self.group_id.as_ref().is_none_or(|g| *g == task.group_id)
            && self.status.is_none_or(|s| s == task.status)
    }
}

// =============================================================================
// File
// =============================================================================

/// Metadata of a stored blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub id: FileId,
    pub owner_id: String,
    pub owner_type: OwnerType,
    pub blob_id: String,
    pub bucket_name: String,
    pub name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl File {
    /// Creates file metadata for a blob owned by `owner_id`.
    pub fn new(
        owner_type: OwnerType,
        owner_id: impl Into<String>,
        name: impl Into<String>,
        size: u64,
    ) -> Self {
        let owner_id = owner_id.into();
        let now = Utc::now();
        Self {
            id: FileId::generate(),
            bucket_name: bucket_name(owner_type, &owner_id),
            owner_id,
            owner_type,
            blob_id: crate::types::generate_id(),
            name: name.into(),
            size,
            created_at: now,
            last_modified: now,
        }
    }
}

/// Derives the blob bucket for an owner.
///
/// ```
/// use ward_core::model::bucket_name;
/// use ward_core::types::OwnerType;
///
/// assert_eq!(bucket_name(OwnerType::User, "abc"), "user_abc_bucket");
/// ```
pub fn bucket_name(owner_type: OwnerType, owner_id: &str) -> String {
    format!("{}_{}_bucket", owner_type.as_str(), owner_id)
}

/// File query filter. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFilter {
    pub id: Option<FileId>,
    pub owner_id: Option<String>,
    pub owner_type: Option<OwnerType>,
}

impl FileFilter {
    /// Filter selecting a single file.
    pub fn by_id(id: FileId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// Filter selecting every file owned by a user.
    pub fn owned_by_user(user_id: &UserId) -> Self {
        Self {
            id: None,
            owner_id: Some(user_id.to_string()),
            owner_type: Some(OwnerType::User),
        }
    }

    /// Returns `true` if the file satisfies every set field.
    pub fn matches(&self, file: &File) -> bool {
        self.id.as_ref().is_none_or(|id| *id == file.id)
            && self.owner_id.as_ref().is_none_or(|o| *o == file.owner_id)
            && self.owner_type.is_none_or(|t| t == file.owner_type)
    }
}

// =============================================================================
// Revocation
// =============================================================================

/// A revoked credential, kept until the credential would have expired anyway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationEntry {
    /// Signature segment of the revoked token.
    pub signature: String,
    /// Natural expiry of the revoked token.
    pub expires_at: DateTime<Utc>,
}

impl RevocationEntry {
    pub fn new(signature: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            signature: signature.into(),
            expires_at,
        }
    }

    /// Returns `true` once the underlying token has expired on its own.
    pub fn is_redundant(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

// =============================================================================
// Tests
// =============================================================================
