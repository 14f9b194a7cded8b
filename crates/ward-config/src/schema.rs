// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for Ward.
//!
//! # Schema Structure
//!
//! ```text
//! WardConfig
//! ├── server: ServerConfig
//! ├── security: SecurityConfig
//! ├── root_admin: RootAdminConfig
//! └── logging: LoggingConfig
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Minimum length of the token signing secret in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default session token lifetime (1 hour).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Default API key lifetime (4380 hours).
pub const DEFAULT_API_KEY_TTL: Duration = Duration::from_secs(4380 * 60 * 60);

/// Default revocation purge interval.
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for Ward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WardConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Token configuration.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Seed account for an empty store.
    #[serde(default)]
    pub root_admin: RootAdminConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WardConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.security.validate()?;
        self.root_admin.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout, e.g. `30s`.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Whether self-service registration is served.
    #[serde(default)]
    pub registration_enabled: bool,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

impl ServerConfig {
    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "cannot be zero",
            ));
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::validation(
                "server.max_body_size",
                "cannot be zero",
            ));
        }
        self.cors.validate()?;
        Ok(())
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.bind_address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: DEFAULT_PORT,
            request_timeout: default_request_timeout(),
            max_body_size: default_max_body_size(),
            registration_enabled: false,
            cors: CorsConfig::default(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Whether the CORS layer is installed.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Allowed origins (use "*" for all).
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,

    /// Allow credentials.
    #[serde(default)]
    pub allow_credentials: bool,

    /// Max age in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_age() -> u64 {
    3600
}

impl CorsConfig {
    /// Validates the CORS configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let wildcard = self.allowed_origins.iter().any(|o| o == "*");
        if self.enabled && wildcard && self.allow_credentials {
            return Err(ConfigError::validation(
                "server.cors.allow_credentials",
                "cannot be combined with a wildcard origin",
            ));
        }
        Ok(())
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: default_origins(),
            allow_credentials: false,
            max_age_secs: default_max_age(),
        }
    }
}

// =============================================================================
// Security Configuration
// =============================================================================

/// Token issuance and revocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Token signing secret, at least [`MIN_SECRET_LEN`] bytes.
    #[serde(default)]
    pub secret: Option<SecretValue>,

    /// Token issuer.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Session token lifetime.
    #[serde(default = "default_session_ttl", with = "humantime_serde")]
    pub session_ttl: Duration,

    /// API key lifetime.
    #[serde(default = "default_api_key_ttl", with = "humantime_serde")]
    pub api_key_ttl: Duration,

    /// Clock skew tolerance in seconds.
    #[serde(default)]
    pub leeway_secs: u64,

    /// How often expired revocation entries are dropped.
    #[serde(default = "default_purge_interval", with = "humantime_serde")]
    pub purge_interval: Duration,
}

fn default_issuer() -> String {
    "ward".to_string()
}

fn default_session_ttl() -> Duration {
    DEFAULT_SESSION_TTL
}

fn default_api_key_ttl() -> Duration {
    DEFAULT_API_KEY_TTL
}

fn default_purge_interval() -> Duration {
    DEFAULT_PURGE_INTERVAL
}

impl SecurityConfig {
    /// Validates the security configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        match &self.secret {
            None => return Err(ConfigError::missing_field("security.secret")),
            Some(secret) if secret.len() < MIN_SECRET_LEN => {
                return Err(ConfigError::validation(
                    "security.secret",
                    format!("must be at least {} bytes", MIN_SECRET_LEN),
                ));
            }
            Some(_) => {}
        }
        if self.session_ttl.is_zero() {
            return Err(ConfigError::validation(
                "security.session_ttl",
                "cannot be zero",
            ));
        }
        if self.api_key_ttl.is_zero() {
            return Err(ConfigError::validation(
                "security.api_key_ttl",
                "cannot be zero",
            ));
        }
        if self.purge_interval.is_zero() {
            return Err(ConfigError::validation(
                "security.purge_interval",
                "cannot be zero",
            ));
        }
        Ok(())
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: default_issuer(),
            session_ttl: DEFAULT_SESSION_TTL,
            api_key_ttl: DEFAULT_API_KEY_TTL,
            leeway_secs: 0,
            purge_interval: DEFAULT_PURGE_INTERVAL,
        }
    }
}

// =============================================================================
// Root Admin
// =============================================================================

/// Root-admin account provisioned into an empty store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootAdminConfig {
    /// Name of the root-admin group.
    #[serde(default = "default_root_name")]
    pub group_name: String,

    #[serde(default = "default_root_name")]
    pub username: String,

    #[serde(default = "default_root_email")]
    pub email: String,

    /// Required only when the store is empty at start.
    #[serde(default)]
    pub password: Option<SecretValue>,
}

fn default_root_name() -> String {
    "root".to_string()
}

fn default_root_email() -> String {
    "root@localhost".to_string()
}

impl RootAdminConfig {
    /// Validates the root-admin configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.group_name.trim().is_empty() {
            return Err(ConfigError::missing_field("root_admin.group_name"));
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::missing_field("root_admin.username"));
        }
        if !self.email.contains('@') {
            return Err(ConfigError::validation(
                "root_admin.email",
                "not an email address",
            ));
        }
        Ok(())
    }
}

impl Default for RootAdminConfig {
    fn default() -> Self {
        Self {
            group_name: default_root_name(),
            username: default_root_name(),
            email: default_root_email(),
            password: None,
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include span targets in logs.
    #[serde(default = "default_enabled")]
    pub with_target: bool,
}

impl LoggingConfig {
    /// Validates the logging configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            with_target: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty format for development.
    #[default]
    Pretty,
    /// Compact format.
    Compact,
    /// JSON format for production.
    Json,
}

impl LogFormat {
    /// Parses a format name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "compact" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret that never prints its content.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretValue(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> WardConfig {
        let mut config = WardConfig::default();
        config.security.secret = Some(SecretValue::new("0123456789abcdef0123456789abcdef"));
        config
    }

    #[test]
    fn test_ward_config_default() {
        let config = WardConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(!config.server.registration_enabled);
        assert_eq!(config.security.session_ttl, DEFAULT_SESSION_TTL);
        assert_eq!(config.root_admin.username, "root");
    }

    #[test]
    fn test_secret_required() {
        let err = WardConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = valid();
        config.security.secret = Some(SecretValue::new("too-short"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("security.secret"));
    }

    #[test]
    fn test_zero_durations_rejected() {
        let mut config = valid();
        config.security.purge_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.server.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cors_credentials_with_wildcard() {
        let mut config = valid();
        config.server.cors.allow_credentials = true;
        assert!(config.validate().is_err());

        config.server.cors.allowed_origins = vec!["https://app.example".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secret_value_redacted() {
        let secret = SecretValue::new("my-secret");
        assert_eq!(secret.expose(), "my-secret");
        assert_eq!(secret.to_string(), "***");
        assert!(!format!("{:?}", secret).contains("my-secret"));
    }

    #[test]
    fn test_log_level() {
        assert_eq!(LogLevel::Info.as_str(), "info");
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogFormat::parse("json"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("full"), None);
    }
}
