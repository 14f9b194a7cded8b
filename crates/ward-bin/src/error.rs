// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Failures of the `ward` binary and their process exit codes.
//!
//! Exit codes follow BSD `sysexits`:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 78 `EX_CONFIG` | the configuration or root-admin settings are unusable |
//! | 75 `EX_TEMPFAIL` | a store or the listen address is temporarily unavailable |
//! | 77 `EX_NOPERM` | a credential was refused during startup |
//! | 70 `EX_SOFTWARE` | anything else |

use std::path::{Path, PathBuf};

use thiserror::Error;
use ward_api::ApiError;
use ward_config::ConfigError;

pub const EX_SOFTWARE: i32 = 70;
pub const EX_TEMPFAIL: i32 = 75;
pub const EX_NOPERM: i32 = 77;
pub const EX_CONFIG: i32 = 78;

/// Result type alias for ward-bin operations.
pub type BinResult<T> = Result<T, BinError>;

#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration file could not be loaded.
    #[error("cannot load configuration from {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// Provisioning the root admin on an empty store failed.
    #[error("root admin bootstrap failed")]
    Bootstrap(#[source] ApiError),

    /// The API server could not be built, bound or kept serving.
    #[error("API server failed")]
    Server(#[source] ApiError),

    /// Command output could not be rendered.
    #[error("cannot render output")]
    Output(#[from] serde_json::Error),
}

impl BinError {
    pub fn config(path: impl AsRef<Path>, source: ConfigError) -> Self {
        Self::Config {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => EX_CONFIG,
            Self::Bootstrap(e) | Self::Server(e) => api_exit_code(e),
            Self::Output(_) => EX_SOFTWARE,
        }
    }
}

fn api_exit_code(error: &ApiError) -> i32 {
    match error {
        ApiError::Validation { .. } | ApiError::BadRequest { .. } | ApiError::Conflict { .. } => {
            EX_CONFIG
        }
        ApiError::ServiceUnavailable { .. } => EX_TEMPFAIL,
        ApiError::Unauthenticated { .. } | ApiError::PermissionDenied { .. } => EX_NOPERM,
        ApiError::NotFound { .. } | ApiError::Internal { .. } => EX_SOFTWARE,
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Prints an error and its cause chain to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
    if let BinError::Config { source, .. } = error {
        if let Some(field) = source.field() {
            eprintln!("  Check setting: {}", field);
        }
    }
}

/// Reports an error and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================
