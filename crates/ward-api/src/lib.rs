// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ward-api
//!
//! Token service, request scoping and the RPC-style HTTP surface for Ward.
//!
//! - **Auth**: signed tokens with revocation, the per-method authorization
//!   gate, and scope derivation for every user, group and task operation
//! - **Services**: `AuthService`, `UserService`, `GroupService`, `TaskService`
//! - **Server**: axum router with one `POST` route per RPC method
//! - **Bootstrap**: root-admin provisioning on an empty store
//!
//! ## Example
//!
//! ```rust,ignore
//! use ward_api::{ApiConfig, ApiServerBuilder, JwtConfig};
//!
//! let config = ApiConfig::default().with_jwt(JwtConfig::new(secret));
//! let server = ApiServerBuilder::new().config(config).build()?;
//! server.run_with_shutdown(shutdown_signal).await?;
//! ```

#![deny(unsafe_code)]

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod service;
pub mod state;

pub use auth::{
    AccessTable, AuthContext, AuthorizationGate, EntityKind, JwtConfig, Scope, ScopeOp,
    TokenClaims, TokenCodec, TokenKind, TokenService,
};
pub use bootstrap::bootstrap_root_admin;
pub use config::{ApiConfig, CorsConfig, RootAdmin};
pub use error::{ApiError, ApiResult};
pub use response::{ApiResponse, DeleteResponse, TokenResponse};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder, Stores};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
