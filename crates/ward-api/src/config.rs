// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::JwtConfig;

// =============================================================================
// ApiConfig
// =============================================================================

/// Configuration for the API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Token signing configuration.
    pub jwt: JwtConfig,
    /// Whether `AuthService/Register` is served.
    pub registration_enabled: bool,
    /// Request timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            cors: CorsConfig::default(),
            jwt: JwtConfig::default(),
            registration_enabled: false,
            request_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024,
        }
    }
}

impl ApiConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the token configuration.
    pub fn with_jwt(mut self, jwt: JwtConfig) -> Self {
        self.jwt = jwt;
        self
    }

    /// Enables or disables self-service registration.
    pub fn with_registration(mut self, enabled: bool) -> Self {
        self.registration_enabled = enabled;
        self
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Whether the CORS layer is installed.
    pub enabled: bool,
    /// Allowed origins. `*` allows any.
    pub allowed_origins: Vec<String>,
    /// Whether to allow credentials.
    pub allow_credentials: bool,
    /// Max age for preflight cache (seconds).
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    /// Restricts CORS to the given origins.
    pub fn strict(origins: Vec<String>) -> Self {
        Self {
            enabled: true,
            allowed_origins: origins,
            allow_credentials: true,
            max_age: 3600,
        }
    }

    /// Returns `true` if any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

// =============================================================================
// RootAdmin
// =============================================================================

/// Seed account created when the group store is empty.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RootAdmin {
    /// Name of the root-admin group.
    pub group_name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Default for RootAdmin {
    fn default() -> Self {
        Self {
            group_name: "root".to_string(),
            username: "root".to_string(),
            email: "root@localhost".to_string(),
            password: String::new(),
        }
    }
}

impl std::fmt::Debug for RootAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootAdmin")
            .field("group_name", &self.group_name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
