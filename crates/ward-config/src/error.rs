// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration errors.
//!
//! Each variant names the file, setting or environment variable at fault so
//! that `ward validate` can point at the line to fix.

use std::path::PathBuf;

use thiserror::Error;

use crate::loader::ConfigFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The extension is not one of yaml, yml, toml or json.
    #[error("unsupported config format '{extension}' (expected yaml, toml or json)")]
    UnsupportedFormat { extension: String },

    /// The document does not fit the schema. `path` is unset for in-memory
    /// content.
    #[error("invalid {format} config{}: {message}", located(.path))]
    Parse {
        format: ConfigFormat,
        path: Option<PathBuf>,
        message: String,
    },

    #[error("missing required setting: {field}")]
    MissingField { field: &'static str },

    /// A setting is present but unusable, e.g. a short token secret.
    #[error("invalid setting {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A `WARD_*` override could not be parsed.
    #[error("invalid value in {name}: expected {expected}")]
    InvalidEnvVar {
        name: String,
        expected: &'static str,
    },
}

impl ConfigError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    pub fn parse(format: ConfigFormat, message: impl ToString) -> Self {
        Self::Parse {
            format,
            path: None,
            message: message.to_string(),
        }
    }

    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn invalid_env_var(name: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            expected,
        }
    }

    /// Attaches the source file to a parse error. Other errors pass through.
    pub fn in_file(self, file: impl Into<PathBuf>) -> Self {
        match self {
            Self::Parse {
                format,
                path: None,
                message,
            } => Self::Parse {
                format,
                path: Some(file.into()),
                message,
            },
            other => other,
        }
    }

    /// The setting at fault, for schema and validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field } | Self::Validation { field, .. } => Some(field),
            Self::InvalidEnvVar { name, .. } => Some(name),
            _ => None,
        }
    }
}

fn located(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default()
}

/// A Result type with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
