// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tracing::info;

use crate::cli::Cli;
use crate::error::{BinError, BinResult};
use crate::logging::init_logging;
use crate::runtime::RuntimeBuilder;

/// Executes the `run` command: load config, start logging, serve.
pub async fn run(cli: &Cli) -> BinResult<()> {
    let config = ward_config::load_config(&cli.config)
        .map_err(|source| BinError::config(&cli.config, source))?;

    init_logging(
        cli.effective_log_level(config.logging.level.as_str()),
        cli.effective_log_format(config.logging.format),
    );
    info!(config = %cli.config.display(), "Starting Ward...");

    RuntimeBuilder::new(config).build().run().await
}
