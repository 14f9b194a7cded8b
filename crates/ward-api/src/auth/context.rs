// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;

use uuid::Uuid;
use ward_core::{GroupId, Role, UserId};

use super::TokenClaims;

/// Verified caller attached to a request after the gate admits it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    claims: TokenClaims,
    token: String,
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// Client IP address, when the server exposes connect info.
    pub client_ip: Option<IpAddr>,
}

impl AuthContext {
    /// Creates a context for verified `claims` presented as `token`.
    pub fn new(claims: TokenClaims, token: impl Into<String>) -> Self {
        Self {
            claims,
            token: token.into(),
            request_id: Uuid::now_v7(),
            client_ip: None,
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    /// The raw credential, as presented.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &UserId {
        self.claims.user_id()
    }

    pub fn group_id(&self) -> &GroupId {
        self.claims.group_id()
    }

    pub fn role(&self) -> Role {
        self.claims.role()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use ward_core::User;

    #[test]
    fn test_context_accessors() {
        let user = User::new("ann", "ann@acme.io", "h", GroupId::generate(), Role::Admin);
        let claims = TokenClaims::for_user(&user, Duration::from_secs(60));
        let ctx = AuthContext::new(claims, "a.b.c")
            .with_client_ip("127.0.0.1".parse().unwrap());

        assert_eq!(ctx.user_id(), &user.id);
        assert_eq!(ctx.group_id(), &user.group_id);
        assert_eq!(ctx.role(), Role::Admin);
        assert_eq!(ctx.token(), "a.b.c");
        assert!(ctx.client_ip.is_some());
    }
}
