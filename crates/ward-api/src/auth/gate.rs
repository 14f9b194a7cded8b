// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Method-level authorization.
//!
//! Each RPC method path maps to a minimum [`Role`]. Methods missing from the
//! table are let through without a credential.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};
use ward_core::Role;

use super::{AuthContext, TokenService};
use crate::error::{ApiError, ApiResult};

// =============================================================================
// Access Table
// =============================================================================

const AUTH_SERVICE: &str = "/authService.AuthService";
const USER_SERVICE: &str = "/usersService.UserService";
const GROUP_SERVICE: &str = "/groupsService.GroupService";
const TASK_SERVICE: &str = "/tasksService.TaskService";

/// Method path to minimum role.
#[derive(Debug, Clone, Default)]
pub struct AccessTable {
    routes: HashMap<String, Role>,
}

impl AccessTable {
    /// Creates an empty table. Every method is public.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the table covering the built-in services.
    pub fn with_default_routes() -> Self {
        let mut table = Self::new();

        for method in ["Logout", "Refresh", "GenerateKey", "UpdatePassword"] {
            table.insert(format!("{AUTH_SERVICE}/{method}"), Role::Member);
        }

        for method in ["Create", "Update", "Delete"] {
            table.insert(format!("{USER_SERVICE}/{method}"), Role::Admin);
        }
        for method in ["Get", "GetGroupUsers", "Find"] {
            table.insert(format!("{USER_SERVICE}/{method}"), Role::Member);
        }

        for method in ["Create", "Delete"] {
            table.insert(format!("{GROUP_SERVICE}/{method}"), Role::Root);
        }
        table.insert(format!("{GROUP_SERVICE}/Update"), Role::Admin);
        for method in ["Get", "Find"] {
            table.insert(format!("{GROUP_SERVICE}/{method}"), Role::Member);
        }

        for method in [
            "Create",
            "Update",
            "Get",
            "Find",
            "Delete",
            "GetGroupTasks",
            "GetUserTasks",
        ] {
            table.insert(format!("{TASK_SERVICE}/{method}"), Role::Member);
        }

        table
    }

    /// Builds a table from `(method, role)` string pairs.
    ///
    /// Unknown role names are rejected.
    pub fn parse<'a, I>(entries: I) -> ApiResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = Self::new();
        for (method, role) in entries {
            let role: Role = role.parse().map_err(|_| {
                ApiError::internal(format!("unknown role '{}' for method {}", role, method))
            })?;
            table.insert(method, role);
        }
        Ok(table)
    }

    /// Sets the minimum role for `method`.
    pub fn insert(&mut self, method: impl Into<String>, role: Role) -> &mut Self {
        self.routes.insert(method.into(), role);
        self
    }

    /// Returns the minimum role for `method`, if it is protected.
    pub fn required_role(&self, method: &str) -> Option<Role> {
        self.routes.get(method).copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// =============================================================================
// AuthorizationGate
// =============================================================================

/// Decides whether a call to a method may proceed.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    tokens: TokenService,
    table: Arc<AccessTable>,
}

impl AuthorizationGate {
    pub fn new(tokens: TokenService, table: AccessTable) -> Self {
        Self {
            tokens,
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &AccessTable {
        &self.table
    }

    /// Authorizes a call to `method` carrying `token`.
    ///
    /// Returns `Ok(None)` for unprotected methods and the verified context
    /// otherwise.
    pub async fn authorize(
        &self,
        method: &str,
        token: Option<&str>,
    ) -> ApiResult<Option<AuthContext>> {
        let Some(required) = self.table.required_role(method) else {
            return Ok(None);
        };

        let token = match token.map(str::trim) {
            Some(token) if !token.is_empty() => token,
            _ => {
                debug!(method, "No authorization token provided");
                return Err(ApiError::unauthenticated(
                    "authorization token is not provided",
                ));
            }
        };

        match self.tokens.verify_token(token, required).await {
            Ok(claims) => Ok(Some(AuthContext::new(claims, token))),
            Err(ApiError::Unauthenticated { message }) => {
                warn!(method, reason = %message, "Token verification failed");
                Err(ApiError::unauthenticated(format!(
                    "access token is invalid: {}",
                    message
                )))
            }
            Err(err) => {
                if err.is_access_denial() {
                    warn!(method, required = %required, "Insufficient role");
                }
                Err(err)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, TokenCodec, TokenKind};
    use ward_core::{Group, GroupStore, MemoryStores, User, UserStore};

    async fn gate_with_user(role: Role) -> (AuthorizationGate, String) {
        let stores = MemoryStores::new();
        let group = stores.groups.create(Group::new("acme")).await.unwrap();
        let user = stores
            .users
            .create(User::new("ann", "ann@acme.io", "h", group.id, role))
            .await
            .unwrap();
        let tokens = TokenService::new(
            TokenCodec::new(JwtConfig::new("test-secret-key-that-is-long-enough-for-testing"))
                .unwrap(),
            stores.users.clone(),
            stores.groups.clone(),
            stores.revocations.clone(),
        );
        let token = tokens.issue_token(&user, TokenKind::Session).unwrap();
        (
            AuthorizationGate::new(tokens, AccessTable::with_default_routes()),
            token,
        )
    }

    #[test]
    fn test_default_table() {
        let table = AccessTable::with_default_routes();
        assert_eq!(
            table.required_role("/usersService.UserService/Create"),
            Some(Role::Admin)
        );
        assert_eq!(
            table.required_role("/groupsService.GroupService/Delete"),
            Some(Role::Root)
        );
        assert_eq!(
            table.required_role("/tasksService.TaskService/GetUserTasks"),
            Some(Role::Member)
        );
        assert_eq!(table.required_role("/authService.AuthService/Login"), None);
    }

    #[test]
    fn test_parse_rejects_unknown_role() {
        assert!(AccessTable::parse([("/a.A/B", "admin"), ("/a.A/C", "root")]).is_ok());
        assert!(AccessTable::parse([("/a.A/B", "superuser")]).is_err());
    }

    #[tokio::test]
    async fn test_unlisted_method_passes() {
        let (gate, _) = gate_with_user(Role::Member).await;
        let ctx = gate.authorize("/authService.AuthService/Login", None).await;
        assert!(ctx.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_token() {
        let (gate, _) = gate_with_user(Role::Member).await;
        let err = gate
            .authorize("/tasksService.TaskService/Find", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "authorization token is not provided");
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let (gate, _) = gate_with_user(Role::Member).await;
        let err = gate
            .authorize("/tasksService.TaskService/Find", Some("a.b.c"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated { .. }));
        assert!(err.to_string().starts_with("access token is invalid: "));
    }

    #[tokio::test]
    async fn test_insufficient_role() {
        let (gate, token) = gate_with_user(Role::Member).await;
        let err = gate
            .authorize("/usersService.UserService/Create", Some(&token))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied { .. }));

        let ctx = gate
            .authorize("/usersService.UserService/Find", Some(&token))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ctx.claims().role(), Role::Member);
    }
}
