// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use ward_core::{
    CascadeDeleter, FileStore, GroupStore, MemoryStores, RevocationStore, TaskStore, UserStore,
};

use crate::auth::{AccessTable, AuthorizationGate, TokenCodec, TokenService};
use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::service::{AuthService, GroupService, TaskService, UserService};

// =============================================================================
// Stores
// =============================================================================

/// The store handles the API runs against.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub groups: Arc<dyn GroupStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub files: Arc<dyn FileStore>,
    pub revocations: Arc<dyn RevocationStore>,
}

impl Stores {
    /// Fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self::from(&MemoryStores::new())
    }
}

impl From<&MemoryStores> for Stores {
    fn from(stores: &MemoryStores) -> Self {
        Self {
            users: stores.users.clone(),
            groups: stores.groups.clone(),
            tasks: stores.tasks.clone(),
            files: stores.files.clone(),
            revocations: stores.revocations.clone(),
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// This is the central state container that is passed to all handlers via
/// Axum's state extraction mechanism.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    stores: Stores,
    tokens: TokenService,
    gate: AuthorizationGate,
    cascade: CascadeDeleter,
    auth: AuthService,
    users: UserService,
    groups: GroupService,
    tasks: TaskService,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Returns the authorization gate.
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    pub fn cascade(&self) -> &CascadeDeleter {
        &self.cascade
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn groups(&self) -> &GroupService {
        &self.groups
    }

    pub fn tasks(&self) -> &TaskService {
        &self.tasks
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    stores: Option<Stores>,
    access_table: Option<AccessTable>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the stores. Defaults to fresh in-memory stores.
    pub fn stores(mut self, stores: Stores) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Replaces the default method table.
    pub fn access_table(mut self, table: AccessTable) -> Self {
        self.access_table = Some(table);
        self
    }

    /// Builds the AppState.
    ///
    /// Fails if the token configuration is invalid.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();
        let stores = self.stores.unwrap_or_else(Stores::in_memory);

        let codec = TokenCodec::new(config.jwt.clone())?;
        let tokens = TokenService::new(
            codec,
            stores.users.clone(),
            stores.groups.clone(),
            stores.revocations.clone(),
        );
        let gate = AuthorizationGate::new(
            tokens.clone(),
            self.access_table
                .unwrap_or_else(AccessTable::with_default_routes),
        );
        let cascade = CascadeDeleter::new(
            stores.users.clone(),
            stores.tasks.clone(),
            stores.files.clone(),
        );

        let auth = AuthService::new(
            tokens.clone(),
            stores.users.clone(),
            stores.groups.clone(),
            config.registration_enabled,
        );
        let users = UserService::new(stores.users.clone(), stores.groups.clone(), cascade.clone());
        let groups = GroupService::new(stores.groups.clone(), cascade.clone());
        let tasks = TaskService::new(stores.tasks.clone(), stores.users.clone());

        Ok(AppState {
            config: Arc::new(config),
            stores,
            tokens,
            gate,
            cascade,
            auth,
            users,
            groups,
            tasks,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl axum::extract::FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;

    #[test]
    fn test_app_state_builder() {
        let config = ApiConfig::default()
            .with_jwt(JwtConfig::new("test-secret-key-that-is-long-enough-for-testing"));
        let state = AppState::builder().config(config).build().unwrap();
        assert!(!state.gate().table().is_empty());
    }

    #[test]
    fn test_builder_requires_secret() {
        assert!(AppState::builder().build().is_err());
    }

    #[test]
    fn test_custom_access_table() {
        let config = ApiConfig::default()
            .with_jwt(JwtConfig::new("test-secret-key-that-is-long-enough-for-testing"));
        let state = AppState::builder()
            .config(config)
            .access_table(AccessTable::new())
            .build()
            .unwrap();
        assert!(state.gate().table().is_empty());
    }
}
