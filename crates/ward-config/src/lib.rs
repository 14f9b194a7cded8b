// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ward-config
//!
//! Configuration management for Ward.
//!
//! ## Features
//!
//! - **Schema Definition**: server, security, root-admin and logging sections
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `WARD_*` variables override file values
//!
//! ## Quick Start
//!
//! ```no_run
//! use ward_config::loader::load_config;
//!
//! let config = load_config("ward.yaml").unwrap();
//! println!("Listening on {}", config.server.socket_addr());
//! ```
//!
//! Values in config files can reference environment variables:
//!
//! ```yaml
//! security:
//!   secret: "${WARD_SECRET}"
//! root_admin:
//!   email: "${ROOT_EMAIL:root@localhost}"
//! ```

#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader};
pub use schema::{
    CorsConfig, LogFormat, LogLevel, LoggingConfig, RootAdminConfig, SecretValue,
    SecurityConfig, ServerConfig, WardConfig,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
