// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Builders for users and tasks with defaults that pass validation.

use chrono::{DateTime, Duration, Utc};
use ward_core::{FileId, GroupId, Role, Task, TaskStatus, User, UserId};

use super::unique_test_id;

// =============================================================================
// User Builder
// =============================================================================

/// Builder for [`User`] records.
#[derive(Debug, Clone)]
pub struct UserBuilder {
    username: Option<String>,
    email: Option<String>,
    password_hash: String,
    group_id: GroupId,
    role: Role,
    image_id: Option<FileId>,
}

impl UserBuilder {
    /// A member of `group_id` with a generated username and email.
    pub fn new(group_id: GroupId) -> Self {
        Self {
            username: None,
            email: None,
            password_hash: "not-a-real-hash".to_string(),
            group_id,
            role: Role::Member,
            image_id: None,
        }
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = hash.into();
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn admin(self) -> Self {
        self.role(Role::Admin)
    }

    pub fn image(mut self, image_id: FileId) -> Self {
        self.image_id = Some(image_id);
        self
    }

    pub fn build(self) -> User {
        let username = self.username.unwrap_or_else(unique_test_id);
        let email = self
            .email
            .unwrap_or_else(|| format!("{}@ward.test", username));
        let user = User::new(username, email, self.password_hash, self.group_id, self.role);
        match self.image_id {
            Some(image_id) => user.with_image(image_id),
            None => user,
        }
    }
}

// =============================================================================
// Task Builder
// =============================================================================

/// Builder for [`Task`] records.
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    name: String,
    description: String,
    status: TaskStatus,
    due: DateTime<Utc>,
    user_id: UserId,
    group_id: GroupId,
}

impl TaskBuilder {
    /// A not-started task owned by `owner`, due in a week.
    pub fn for_user(owner: &User) -> Self {
        Self {
            name: "task".to_string(),
            description: String::new(),
            status: TaskStatus::NotStarted,
            due: Utc::now() + Duration::days(7),
            user_id: owner.id.clone(),
            group_id: owner.group_id.clone(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Due `days` from now. Negative values give an overdue task.
    pub fn due_in_days(mut self, days: i64) -> Self {
        self.due = Utc::now() + Duration::days(days);
        self
    }

    pub fn build(self) -> Task {
        let mut task = Task::new(self.name, self.due, self.user_id, self.group_id)
            .with_description(self.description);
        task.status = self.status;
        task
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_builder_defaults() {
        let group = GroupId::generate();
        let user = UserBuilder::new(group.clone()).build();
        assert_eq!(user.group_id, group);
        assert_eq!(user.role, Role::Member);
        assert!(user.email.ends_with("@ward.test"));
        assert!(user.image_id.is_none());
    }

    #[test]
    fn test_task_builder_inherits_owner_group() {
        let owner = UserBuilder::new(GroupId::generate()).admin().build();
        let task = TaskBuilder::for_user(&owner)
            .name("ship")
            .status(TaskStatus::InProgress)
            .build();
        assert_eq!(task.user_id, owner.id);
        assert_eq!(task.group_id, owner.group_id);
        assert_eq!(task.status, TaskStatus::InProgress);
    }
}
