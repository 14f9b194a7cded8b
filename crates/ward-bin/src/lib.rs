// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ward-bin
//!
//! CLI binary for Ward.
//!
//! - CLI argument parsing with clap
//! - Runtime orchestration: bootstrap, revocation purge, API server
//! - Graceful shutdown handling
//! - Logging initialization
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! ward
//!
//! # Start with custom config
//! ward -c /etc/ward/config.yaml
//!
//! # Validate configuration
//! ward validate --show-config
//!
//! # Show version
//! ward version
//! ```

#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{RuntimeBuilder, WardRuntime};
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
