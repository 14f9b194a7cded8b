// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! Every RPC method is a `POST` taking a JSON body:
//!
//! - [`health`]: Liveness and readiness
//! - [`auth`]: `authService.AuthService`
//! - [`users`]: `usersService.UserService`
//! - [`groups`]: `groupsService.GroupService`
//! - [`tasks`]: `tasksService.TaskService`

mod auth;
mod groups;
mod health;
mod tasks;
mod users;

pub use auth::*;
pub use groups::*;
pub use health::*;
pub use tasks::*;
pub use users::*;

use serde::Deserialize;

/// Body addressing a single record.
#[derive(Debug, Deserialize)]
pub struct ByIdRequest<T> {
    pub id: T,
}

/// Body addressing a group.
#[derive(Debug, Deserialize)]
pub struct ByGroupRequest<T> {
    pub group_id: T,
}

/// Body addressing a user.
#[derive(Debug, Deserialize)]
pub struct ByUserRequest<T> {
    pub user_id: T,
}
