// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading and processing for Ward.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and pick the format from its extension
//! 2. Substitute `${VAR}` / `${VAR:default}` placeholders
//! 3. Parse into [`WardConfig`]
//! 4. Apply `WARD_*` environment overrides
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! WARD_SERVER_PORT=9090
//! WARD_SECURITY_SECRET=...
//! WARD_ROOT_ADMIN_PASSWORD=...
//! WARD_LOG_LEVEL=debug
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogFormat, LogLevel, SecretValue, WardConfig};
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default prefix of override variables.
pub const DEFAULT_ENV_PREFIX: &str = "WARD";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for Ward.
///
/// # Examples
///
/// ```no_run
/// use ward_config::loader::ConfigLoader;
///
/// let loader = ConfigLoader::new();
/// let config = loader.load("ward.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve environment variables in values.
    resolve_env_vars: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables placeholder substitution and overrides.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The file format is determined by the file extension:
    /// - `.yaml` or `.yml` - YAML format
    /// - `.toml` - TOML format
    /// - `.json` - JSON format
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<WardConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;

        let config = self
            .load_from_str(&content, format)
            .map_err(|e| e.in_file(path))?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<WardConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        let mut config = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        debug!(
            port = config.server.port,
            registration = config.server.registration_enabled,
            "Configuration validated"
        );

        Ok(config)
    }

    /// Reads file content.
    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    /// Resolves environment variable placeholders in content.
    ///
    /// Supports the format: `${VAR_NAME}` or `${VAR_NAME:default}`
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next();

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (var_name, default_value) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (env::var(var_name), default_value) {
                (Ok(value), _) => result.push_str(&value),
                (Err(_), Some(default)) => result.push_str(default),
                (Err(_), None) => {
                    // Keep the placeholder; validation reports the field.
                    warn!("Environment variable '{}' not found", var_name);
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        }

        result
    }

    fn var(&self, suffix: &str) -> (String, Option<String>) {
        let name = format!("{}_{}", self.env_prefix, suffix);
        let value = env::var(&name).ok();
        (name, value)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&self, config: &mut WardConfig) -> ConfigResult<()> {
        // Server
        if let (name, Some(value)) = self.var("SERVER_BIND_ADDRESS") {
            config.server.bind_address = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "an IP address"))?;
        }
        if let (name, Some(value)) = self.var("SERVER_PORT") {
            config.server.port = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "a port number"))?;
        }
        if let (_, Some(value)) = self.var("REGISTRATION_ENABLED") {
            config.server.registration_enabled = parse_bool(&value);
        }
        if let (_, Some(value)) = self.var("CORS_ENABLED") {
            config.server.cors.enabled = parse_bool(&value);
        }

        // Security
        if let (_, Some(value)) = self.var("SECURITY_SECRET") {
            config.security.secret = Some(SecretValue::new(value));
        }
        if let (_, Some(value)) = self.var("SECURITY_ISSUER") {
            config.security.issuer = value;
        }

        // Root admin
        if let (_, Some(value)) = self.var("ROOT_ADMIN_PASSWORD") {
            config.root_admin.password = Some(SecretValue::new(value));
        }
        if let (_, Some(value)) = self.var("ROOT_ADMIN_EMAIL") {
            config.root_admin.email = value;
        }

        // Logging
        if let (name, Some(value)) = self.var("LOG_LEVEL") {
            config.logging.level = LogLevel::parse(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "one of trace, debug, info, warn, error"))?;
        }
        if let (name, Some(value)) = self.var("LOG_FORMAT") {
            config.logging.format = LogFormat::parse(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "one of pretty, compact, json"))?;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parses a string based on format.
fn parse_str(content: &str, format: ConfigFormat) -> ConfigResult<WardConfig> {
    match format {
        ConfigFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| ConfigError::parse(format, e))
        }
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::parse(format, e)),
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::parse(format, e))
        }
    }
}

/// Parses a string to bool.
fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "enabled"
    )
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
///
/// ```no_run
/// use ward_config::loader::load_config;
///
/// let config = load_config("ward.yaml").unwrap();
/// ```
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<WardConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<WardConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================
