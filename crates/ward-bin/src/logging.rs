// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use ward_config::LogFormat;

/// Noisy dependencies held at a lower level.
const DEPENDENCY_DIRECTIVES: &str = "hyper=warn,tower=warn,tower_http=info,axum=info";

// =============================================================================
// Logging Initialization
// =============================================================================

/// Initializes the logging subsystem.
///
/// `RUST_LOG` takes precedence over `level` when set. A second call is a
/// no-op.
///
/// ```ignore
/// use ward_bin::logging::init_logging;
/// use ward_config::LogFormat;
///
/// init_logging("info", LogFormat::Pretty);
/// ```
pub fn init_logging(level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    match format {
        LogFormat::Pretty => init_pretty_logging(env_filter),
        LogFormat::Json => init_json_logging(env_filter),
        LogFormat::Compact => init_compact_logging(env_filter),
    }
}

/// Builds the filter string for a base level.
pub fn filter_directives(level: &str) -> String {
    format!("{},{}", level, DEPENDENCY_DIRECTIVES)
}

/// Initializes human-readable logging (default).
fn init_pretty_logging(filter: EnvFilter) {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(is_terminal),
        )
        .try_init();
}

/// Initializes JSON logging (for production/log aggregation).
fn init_json_logging(filter: EnvFilter) {
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .try_init();
}

/// Initializes compact logging (minimal output).
fn init_compact_logging(filter: EnvFilter) {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_ansi(is_terminal),
        )
        .try_init();
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives() {
        let directives = filter_directives("debug");
        assert!(directives.starts_with("debug,"));
        assert!(directives.contains("hyper=warn"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging("info", LogFormat::Compact);
        init_logging("debug", LogFormat::Json);
    }
}
