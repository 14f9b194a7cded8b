// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token claims.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use ward_core::{GroupId, Role, User, UserId, WardError};

// =============================================================================
// TokenKind
// =============================================================================

/// The two credential flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived login session.
    Session,
    /// Long-lived API key.
    Api,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Session => "session",
            TokenKind::Api => "api",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TokenClaims
// =============================================================================

/// Claims carried by a Ward credential.
///
/// The load-bearing claims are `id`, `role`, `root`, `group_id` and `exp`.
/// Internally the role is a single [`Role`]; on the wire it is split into a
/// `role` string and a `root` flag, and combinations that do not map to a
/// role are rejected when a token is decoded. `iat`, `jti` and `iss` are
/// bookkeeping.
///
/// Claims are immutable once issued. Refreshing a session always mints new
/// claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireClaims", try_from = "WireClaims")]
pub struct TokenClaims {
    user_id: UserId,
    role: Role,
    group_id: GroupId,
    exp: i64,
    iat: i64,
    jti: String,
    iss: Option<String>,
}

impl TokenClaims {
    /// Creates claims for `user`, valid for `ttl` from now.
    pub fn for_user(user: &User, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();
        Self {
            user_id: user.id.clone(),
            role: user.role,
            group_id: user.group_id.clone(),
            exp: now.saturating_add(ttl.as_secs() as i64),
            iat: now,
            jti: Uuid::now_v7().to_string(),
            iss: None,
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Overrides the expiry timestamp.
    pub fn with_expiry(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    /// Returns `true` if the subject belongs to the root-admin group.
    pub fn is_root_admin(&self) -> bool {
        self.role.is_root()
    }

    /// Returns `true` for admins and root admins.
    pub fn is_admin(&self) -> bool {
        self.role >= Role::Admin
    }

    /// Expiry as a Unix timestamp.
    pub fn exp(&self) -> i64 {
        self.exp
    }

    pub fn jti(&self) -> &str {
        &self.jti
    }

    pub fn issuer(&self) -> Option<&str> {
        self.iss.as_deref()
    }

    /// Expiry as a `DateTime`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Returns `true` unless `exp` lies strictly in the future.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Checks that the subject and group ids are usable.
    pub fn validate(&self) -> Result<(), WardError> {
        let mut missing = Vec::new();
        if !self.user_id.is_valid() {
            missing.push("id");
        }
        if !self.group_id.is_valid() {
            missing.push("group_id");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(WardError::missing_fields("token", &missing))
        }
    }
}

// =============================================================================
// Wire Form
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireClaims {
    id: String,
    role: String,
    root: bool,
    group_id: String,
    exp: i64,
    #[serde(default)]
    iat: i64,
    #[serde(default)]
    jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
}

impl From<TokenClaims> for WireClaims {
    fn from(claims: TokenClaims) -> Self {
        Self {
            id: claims.user_id.into_inner(),
            role: claims.role.wire_name().to_string(),
            root: claims.role.is_root(),
            group_id: claims.group_id.into_inner(),
            exp: claims.exp,
            iat: claims.iat,
            jti: claims.jti,
            iss: claims.iss,
        }
    }
}

impl TryFrom<WireClaims> for TokenClaims {
    type Error = WardError;

    fn try_from(wire: WireClaims) -> Result<Self, Self::Error> {
        let role = Role::from_wire(&wire.role, wire.root)?;
        let claims = Self {
            user_id: UserId::new(wire.id),
            role,
            group_id: GroupId::new(wire.group_id),
            exp: wire.exp,
            iat: wire.iat,
            jti: wire.jti,
            iss: wire.iss,
        };
        claims.validate()?;
        Ok(claims)
    }
}

// =============================================================================
// Tests
// =============================================================================
