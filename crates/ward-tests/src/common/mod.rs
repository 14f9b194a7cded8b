// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Common Test Utilities
//!
//! Shared fixtures and helpers for the integration tests. Every test builds
//! its own in-memory stores, so tests never share state.
//!
//! ## Module Structure
//!
//! - `fixtures`: Seeded tenants, signing secret and API configuration
//! - `builders`: Builders for users and tasks
//! - `mocks`: Store wrappers with injectable failures

pub mod builders;
pub mod fixtures;
pub mod mocks;

pub use builders::*;
pub use fixtures::*;
pub use mocks::*;

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize test logging. Call this at the start of each test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,ward=debug")),
            )
            .with_test_writer()
            .init();
    });
}

/// Generate a unique suffix for names that must not collide across tests.
pub fn unique_test_id() -> String {
    format!("test_{}", uuid::Uuid::now_v7().simple())
}
