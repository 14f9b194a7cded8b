// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - Token claims, signing and revocation
//! - Request scoping per caller role
//! - The method-level authorization gate
//! - Password hashing

mod claims;
mod context;
mod gate;
mod jwt;
pub mod password;
pub mod scope;
mod token;

pub use claims::{TokenClaims, TokenKind};
pub use context::AuthContext;
pub use gate::{AccessTable, AuthorizationGate};
pub use jwt::{token_signature, JwtConfig, TokenCodec};
pub use scope::{
    backfill_task, derive_scope, verify_group_request_scope, verify_user_request_scope,
    EntityKind, Scope, ScopeOp,
};
pub use token::TokenService;
