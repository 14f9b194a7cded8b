// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for Ward.
//!
//! Identifiers, the role hierarchy, and the small enums shared by every
//! entity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WardError;

// =============================================================================
// Identifiers
// =============================================================================

/// Length of a well-formed identifier.
pub const ID_LEN: usize = 24;

/// The all-zero identifier, treated as unset.
pub const NIL_ID: &str = "000000000000000000000000";

/// Returns `true` if `id` is a usable identifier.
///
/// Identifiers are 24 lowercase hex characters. The empty string and the
/// all-zero identifier are rejected.
///
/// # Examples
///
/// ```
/// use ward_core::types::is_valid_id;
///
/// assert!(is_valid_id("64f0c2a1b3d4e5f6a7b8c9d0"));
/// assert!(!is_valid_id(""));
/// assert!(!is_valid_id("000000000000000000000000"));
/// ```
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LEN
        && id != NIL_ID
        && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Generates a fresh time-ordered identifier.
pub fn generate_id() -> String {
    let mut hex = uuid::Uuid::now_v7().simple().to_string();
    hex.truncate(ID_LEN);
    hex
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an identifier string without validating it.
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generates a fresh identifier.
            pub fn generate() -> Self {
                Self(generate_id())
            }

            /// Parses and validates an identifier.
            pub fn parse(id: &str) -> Result<Self, WardError> {
                if is_valid_id(id) {
                    Ok(Self(id.to_string()))
                } else {
                    Err(WardError::validation(format!(
                        "{} is an invalid {}",
                        id,
                        stringify!($name)
                    )))
                }
            }

            /// Returns `true` if the identifier is well formed and not nil.
            #[inline]
            pub fn is_valid(&self) -> bool {
                is_valid_id(&self.0)
            }

            /// Returns the ID as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the ID and returns the inner string.
            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Group`](crate::model::Group).
    GroupId
);
entity_id!(
    /// Identifier of a [`User`](crate::model::User).
    UserId
);
entity_id!(
    /// Identifier of a [`Task`](crate::model::Task).
    TaskId
);
entity_id!(
    /// Identifier of a [`File`](crate::model::File).
    FileId
);

// =============================================================================
// Role
// =============================================================================

/// Authority level of a user.
///
/// Roles are totally ordered: `Member < Admin < Root`. `Root` is only held by
/// users of the root-admin group. On the wire a root user is rendered as
/// role `admin` plus a separate `root` flag; [`Role::from_wire`] and
/// [`Role::wire_name`] convert between the two forms.
///
/// # Examples
///
/// ```
/// use ward_core::types::Role;
///
/// assert!(Role::Root > Role::Admin);
/// assert_eq!(Role::from_wire("admin", true).unwrap(), Role::Root);
/// assert!(Role::from_wire("member", true).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular group member.
    #[default]
    Member,
    /// Group administrator.
    Admin,
    /// Administrator of the root-admin group.
    Root,
}

impl Role {
    /// Returns the role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
            Role::Root => "root",
        }
    }

    /// Returns the role string used in token claims.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin | Role::Root => "admin",
        }
    }

    /// Returns `true` for the root role.
    #[inline]
    pub fn is_root(&self) -> bool {
        matches!(self, Role::Root)
    }

    /// Returns `true` if this role satisfies `required`.
    #[inline]
    pub fn satisfies(&self, required: Role) -> bool {
        *self >= required
    }

    /// Rebuilds a role from its claim form.
    pub fn from_wire(role: &str, root: bool) -> Result<Self, WardError> {
        match (role, root) {
            ("admin", true) => Ok(Role::Root),
            ("admin", false) => Ok(Role::Admin),
            ("member", false) => Ok(Role::Member),
            ("member", true) => Err(WardError::validation(
                "root admin flag is not valid for role member",
            )),
            ("", _) => Err(WardError::missing_fields("token", &["role"])),
            (other, _) => Err(WardError::validation(format!("unknown role: {}", other))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = WardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            "root" => Ok(Role::Root),
            other => Err(WardError::validation(format!("unknown role: {}", other))),
        }
    }
}

// =============================================================================
// Task Status
// =============================================================================

/// Progress of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet started.
    #[default]
    NotStarted,
    /// Work in progress.
    InProgress,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// Returns the status name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Owner Type
// =============================================================================

/// Kind of entity owning a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    /// Owned by a user.
    User,
    /// Owned by a group.
    Group,
}

impl OwnerType {
    /// Returns the owner type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerType::User => "user",
            OwnerType::Group => "group",
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================
