// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Business operations behind the RPC handlers.
//!
//! Every operation takes the caller's verified claims and narrows itself
//! through the scope resolver before touching a store.

pub mod auth;
pub mod groups;
pub mod tasks;
pub mod users;

pub use auth::AuthService;
pub use groups::GroupService;
pub use tasks::TaskService;
pub use users::UserService;
