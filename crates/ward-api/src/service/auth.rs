// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account and credential operations.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use ward_core::{Group, GroupStore, Role, User, UserFilter, UserStore, WardError};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{AuthContext, TokenKind, TokenService};
use crate::error::{ApiError, ApiResult};
use crate::response::{SessionResponse, TokenResponse};

// =============================================================================
// Requests
// =============================================================================

/// Self-service sign-up.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// =============================================================================
// AuthService
// =============================================================================

/// Registration, login and credential lifecycle.
#[derive(Clone)]
pub struct AuthService {
    tokens: TokenService,
    users: Arc<dyn UserStore>,
    groups: Arc<dyn GroupStore>,
    registration_enabled: bool,
}

impl AuthService {
    pub fn new(
        tokens: TokenService,
        users: Arc<dyn UserStore>,
        groups: Arc<dyn GroupStore>,
        registration_enabled: bool,
    ) -> Self {
        Self {
            tokens,
            users,
            groups,
            registration_enabled,
        }
    }

    fn session(&self, user: &User, kind: TokenKind) -> ApiResult<TokenResponse> {
        let token = self.tokens.issue_token(user, kind)?;
        let ttl = self.tokens.codec().config().ttl(kind);
        Ok(TokenResponse::new(token, ttl.as_secs()))
    }

    /// Creates a group named after the email and an admin user in it.
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<SessionResponse> {
        if !self.registration_enabled {
            return Err(ApiError::not_found("method"));
        }
        let email = req.email.trim().to_lowercase();
        if email.is_empty() || req.password.is_empty() {
            return Err(ApiError::validation(
                "missing the following user fields: email, password",
            ));
        }
        if self.users.find(&UserFilter::by_email(&email)).await.is_ok() {
            return Err(ApiError::conflict("email is already registered"));
        }

        let group = self
            .groups
            .create(Group::new(format!("{}_group", email)))
            .await?;

        let username = if req.username.trim().is_empty() {
            email.clone()
        } else {
            req.username
        };
        let user = User::new(
            username,
            &email,
            hash_password(&req.password)?,
            group.id.clone(),
            Role::Admin,
        )
        .with_name(req.first_name, req.last_name);

        let user = match self.users.create(user).await {
            Ok(user) => user,
            Err(e) => {
                // Leave no orphaned group behind.
                if let Err(cleanup) = self.groups.delete(&group.id).await {
                    warn!(group_id = %group.id, error = %cleanup, "Failed to remove group after failed registration");
                }
                return Err(e.into());
            }
        };

        info!(user_id = %user.id, group_id = %group.id, "User registered");
        let token = self.session(&user, TokenKind::Session)?;
        Ok(SessionResponse { user, token })
    }

    /// Checks the password and opens a session.
    pub async fn login(&self, req: LoginRequest) -> ApiResult<SessionResponse> {
        let email = req.email.trim().to_lowercase();
        let user = match self.users.find(&UserFilter::by_email(&email)).await {
            Ok(user) => user,
            Err(WardError::NotFound { .. }) => {
                return Err(ApiError::unauthenticated("invalid email or password"))
            }
            Err(e) => return Err(e.into()),
        };
        if !verify_password(&req.password, &user.password_hash) {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(ApiError::unauthenticated("invalid email or password"));
        }

        info!(user_id = %user.id, "User logged in");
        let token = self.session(&user, TokenKind::Session)?;
        Ok(SessionResponse { user, token })
    }

    /// Revokes the presented token.
    pub async fn logout(&self, ctx: &AuthContext) -> ApiResult<()> {
        self.tokens.blacklist_auth_token(ctx.token()).await?;
        info!(user_id = %ctx.user_id(), "User logged out");
        Ok(())
    }

    /// Issues a new session token from the live user record.
    pub async fn refresh(&self, ctx: &AuthContext) -> ApiResult<TokenResponse> {
        let user = self.users.find(&UserFilter::by_id(ctx.user_id().clone())).await?;
        self.session(&user, TokenKind::Session)
    }

    /// Issues a long-lived API key.
    pub async fn generate_key(&self, ctx: &AuthContext) -> ApiResult<TokenResponse> {
        let user = self.users.find(&UserFilter::by_id(ctx.user_id().clone())).await?;
        info!(user_id = %user.id, "API key generated");
        self.session(&user, TokenKind::Api)
    }

    pub async fn update_password(
        &self,
        ctx: &AuthContext,
        req: UpdatePasswordRequest,
    ) -> ApiResult<()> {
        let mut user = self.users.find(&UserFilter::by_id(ctx.user_id().clone())).await?;
        if !verify_password(&req.current_password, &user.password_hash) {
            return Err(ApiError::permission_denied("current password is incorrect"));
        }
        user.password_hash = hash_password(&req.new_password)?;
        user.last_modified = chrono::Utc::now();
        self.users.update(user).await?;
        info!(user_id = %ctx.user_id(), "Password updated");
        Ok(())
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("registration_enabled", &self.registration_enabled)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, TokenCodec};
    use ward_core::MemoryStores;

    fn service(stores: &MemoryStores, registration: bool) -> AuthService {
        let tokens = TokenService::new(
            TokenCodec::new(JwtConfig::new("test-secret-key-that-is-long-enough-for-testing"))
                .unwrap(),
            stores.users.clone(),
            stores.groups.clone(),
            stores.revocations.clone(),
        );
        AuthService::new(
            tokens,
            stores.users.clone(),
            stores.groups.clone(),
            registration,
        )
    }

    fn register_req(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "s3cret-pass".to_string(),
            username: String::new(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_disabled() {
        let stores = MemoryStores::new();
        let err = service(&stores, false)
            .register(register_req("ann@acme.io"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let stores = MemoryStores::new();
        let svc = service(&stores, true);
        let session = svc.register(register_req("Ann@Acme.io")).await.unwrap();
        assert_eq!(session.user.role, Role::Admin);

        let group = stores
            .groups
            .find(&ward_core::GroupFilter::by_id(session.user.group_id.clone()))
            .await
            .unwrap();
        assert_eq!(group.name, "ann@acme.io_group");

        let login = svc
            .login(LoginRequest {
                email: "ann@acme.io".into(),
                password: "s3cret-pass".into(),
            })
            .await
            .unwrap();
        assert_eq!(login.user.id, session.user.id);

        let err = svc
            .login(LoginRequest {
                email: "ann@acme.io".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let stores = MemoryStores::new();
        let svc = service(&stores, true);
        svc.register(register_req("ann@acme.io")).await.unwrap();
        let err = svc.register(register_req("ann@acme.io")).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict { .. }));
    }
}
