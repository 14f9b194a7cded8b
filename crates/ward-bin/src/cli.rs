// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the server (default)
//! - `validate`: Validate configuration file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Ward - multi-tenant authorization and scoping server
#[derive(Parser, Debug)]
#[command(
    name = "ward",
    author = "Sylvex <contact@sylvex.io>",
    version = ward_api::VERSION,
    about = "Multi-tenant authorization and scoping server",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "ward.yaml",
        env = "WARD_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, env = "WARD_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, env = "WARD_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the Ward CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the server
    ///
    /// This is the default command when no subcommand is specified.
    Run,

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration file without starting the server.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration (secrets redacted) after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable multi-line format
    #[default]
    Pretty,
    /// Single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl From<LogFormat> for ward_config::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Pretty => ward_config::LogFormat::Pretty,
            LogFormat::Compact => ward_config::LogFormat::Compact,
            LogFormat::Json => ward_config::LogFormat::Json,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }

    /// Resolves the log level: quiet/verbose flags, then `--log-level`,
    /// then the configured level.
    pub fn effective_log_level<'a>(&'a self, configured: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(configured)
        }
    }

    /// Resolves the log format: `--log-format`, then the configured format.
    pub fn effective_log_format(&self, configured: ward_config::LogFormat) -> ward_config::LogFormat {
        self.log_format.map(Into::into).unwrap_or(configured)
    }
}

// =============================================================================
// Tests
// =============================================================================
