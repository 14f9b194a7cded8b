// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token issuance, verification and revocation.
//!
//! Verification is a four-part check, and every part must pass:
//!
//! 1. the token is not revoked,
//! 2. signature and expiry are valid,
//! 3. the live user and group still line up with the claims,
//! 4. the claimed role satisfies the required role.
//!
//! Failing 1-3 is an authentication error; failing 4 is a permission error.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use ward_core::{
    GroupFilter, GroupStore, RevocationEntry, RevocationStore, Role, User, UserFilter, UserStore,
};

use super::jwt::{token_signature, TokenCodec};
use super::{TokenClaims, TokenKind};
use crate::error::{ApiError, ApiResult};

/// Issues, verifies and revokes credentials.
#[derive(Clone)]
pub struct TokenService {
    codec: TokenCodec,
    users: Arc<dyn UserStore>,
    groups: Arc<dyn GroupStore>,
    revocations: Arc<dyn RevocationStore>,
}

impl TokenService {
    pub fn new(
        codec: TokenCodec,
        users: Arc<dyn UserStore>,
        groups: Arc<dyn GroupStore>,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            codec,
            users,
            groups,
            revocations,
        }
    }

    /// Returns the codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Signs a new credential for `user`.
    ///
    /// Session tokens live for the configured session lifetime (one hour by
    /// default), API keys for the API key lifetime (4380 hours by default).
    pub fn issue_token(&self, user: &User, kind: TokenKind) -> ApiResult<String> {
        let mut missing = Vec::new();
        if !user.id.is_valid() {
            missing.push("id");
        }
        if !user.group_id.is_valid() {
            missing.push("group_id");
        }
        if !missing.is_empty() {
            return Err(ApiError::validation(format!(
                "missing the following user fields: {}",
                missing.join(", ")
            )));
        }

        let claims = TokenClaims::for_user(user, self.codec.config().ttl(kind));
        let token = self.codec.encode(&claims)?;
        debug!(user_id = %user.id, kind = %kind, "Token issued");
        Ok(token)
    }

    /// Verifies `token` and checks that it grants at least `required`.
    pub async fn verify_token(&self, token: &str, required: Role) -> ApiResult<TokenClaims> {
        if let Some(signature) = token_signature(token) {
            if self.revocations.contains(signature).await? {
                debug!("Rejected revoked token");
                return Err(ApiError::unauthenticated("invalid token"));
            }
        }

        let claims = self.codec.decode(token)?;

        let user = self
            .users
            .find(&UserFilter::by_id(claims.user_id().clone()))
            .await
            .map_err(|e| {
                warn!(user_id = %claims.user_id(), error = %e, "Token subject lookup failed");
                ApiError::unauthenticated("invalid token: unknown user")
            })?;
        let group = self
            .groups
            .find(&GroupFilter::by_id(claims.group_id().clone()))
            .await
            .map_err(|e| {
                warn!(group_id = %claims.group_id(), error = %e, "Token group lookup failed");
                ApiError::unauthenticated("invalid token: unknown group")
            })?;
        if user.group_id != group.id {
            warn!(user_id = %user.id, "Token group no longer matches user");
            return Err(ApiError::unauthenticated("incorrect group id"));
        }

        let granted = match required {
            Role::Root => claims.is_root_admin(),
            Role::Admin => claims.is_admin(),
            Role::Member => true,
        };
        if !granted {
            return Err(ApiError::permission_denied(format!(
                "{} role required",
                required
            )));
        }

        Ok(claims)
    }

    /// Revokes `token` until its natural expiry.
    ///
    /// Revoking twice is a no-op, and so is revoking a token that has
    /// already expired.
    pub async fn blacklist_auth_token(&self, token: &str) -> ApiResult<()> {
        let signature = token_signature(token)
            .ok_or_else(|| ApiError::unauthenticated("invalid token"))?;
        let claims = self.codec.decode_allow_expired(token)?;
        if claims.is_expired() {
            debug!(user_id = %claims.user_id(), "Skipping revocation of expired token");
            return Ok(());
        }

        self.revocations
            .insert(RevocationEntry::new(signature, claims.expires_at()))
            .await?;
        info!(user_id = %claims.user_id(), "Token revoked");
        Ok(())
    }

    /// Drops revocation entries for tokens that have expired on their own.
    pub async fn purge_revocations(&self) -> ApiResult<u64> {
        let purged = self.revocations.purge_expired(Utc::now()).await?;
        if purged > 0 {
            debug!(purged, "Purged expired revocations");
        }
        Ok(purged)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
