// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ward-core
//!
//! Domain model and persistence contracts for Ward, a multi-tenant
//! authorization and scoping engine.
//!
//! - **Types**: identifiers, the ordered [`Role`] hierarchy, task status
//! - **Model**: `Group`, `User`, `Task`, `File` with filters and patches
//! - **Store**: async store traits, including the revocation registry
//! - **Memory**: in-memory store implementations
//! - **Cascade**: concurrent deletion of records depending on a group or user
//! - **Error**: the [`WardError`] taxonomy
//!
//! ## Example
//!
//! ```rust,ignore
//! use ward_core::{CascadeDeleter, MemoryStores};
//!
//! let stores = MemoryStores::new();
//! let deleter = CascadeDeleter::new(stores.users.clone(), stores.tasks.clone(), stores.files.clone());
//! deleter.delete_group_cascade(&group_id).await?;
//! ```

#![deny(unsafe_code)]

pub mod cascade;
pub mod error;
pub mod memory;
pub mod model;
pub mod store;
pub mod types;

pub use cascade::{CascadeDeleter, CascadeReport, CascadeStep, StepOutcome};
pub use error::{WardError, WardResult};
pub use memory::{
    MemoryBlobStore, MemoryFileStore, MemoryGroupStore, MemoryRevocationStore, MemoryStores,
    MemoryTaskStore, MemoryUserStore,
};
pub use model::{
    File, FileFilter, Group, GroupFilter, GroupPatch, RevocationEntry, Task, TaskFilter,
    TaskPatch, User, UserFilter, UserPatch,
};
pub use store::{BlobStore, FileStore, GroupStore, RevocationStore, TaskStore, UserStore};
pub use types::{FileId, GroupId, OwnerType, Role, TaskId, TaskStatus, UserId};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
