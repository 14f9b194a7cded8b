// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Ward Integration Tests
//!
//! Integration tests for the Ward authorization server, together with the
//! fixtures, builders and failure-injecting stores they share.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: A seeded two-tenant world and test configuration
//!   - `builders`: Builders for users and tasks
//!   - `mocks`: Store wrappers with switchable failures
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p ward-tests
//!
//! # Run a specific suite
//! cargo test -p ward-tests --test integration_tokens
//! cargo test -p ward-tests --test integration_scope
//! cargo test -p ward-tests --test integration_cascade
//! cargo test -p ward-tests --test integration_api
//! cargo test -p ward-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! - `integration_tokens.rs`: issuing, verifying and revoking credentials
//! - `integration_scope.rs`: scope derivation and service-level restriction
//! - `integration_cascade.rs`: group and user cascades, including partial failure
//! - `integration_api.rs`: the RPC surface end to end through the router
//! - `integration_config.rs`: loading configuration files and overrides

pub mod common;

pub use common::*;
