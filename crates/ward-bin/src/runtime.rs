// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server runtime orchestration.
//!
//! - Configuration mapping into the API layer
//! - Root-admin bootstrap on an empty store
//! - Periodic revocation purge
//! - API server with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use ward_api::{
    bootstrap_root_admin, ApiConfig, ApiServerBuilder, CorsConfig, JwtConfig, RootAdmin, Stores,
    TokenService,
};
use ward_config::WardConfig;

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// WardRuntime
// =============================================================================

/// The runtime that wires configuration, stores and the API server together.
pub struct WardRuntime {
    config: Arc<WardConfig>,
    stores: Stores,
    shutdown: ShutdownCoordinator,
}

impl WardRuntime {
    /// Creates a new runtime over fresh in-memory stores.
    pub fn new(config: WardConfig) -> Self {
        Self {
            config: Arc::new(config),
            stores: Stores::in_memory(),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Replaces the stores.
    pub fn with_stores(mut self, stores: Stores) -> Self {
        self.stores = stores;
        self
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Runs the server until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting Ward v{}", ward_api::VERSION);

        let server = ApiServerBuilder::new()
            .config(api_config(&self.config))
            .stores(self.stores.clone())
            .build()
            .map_err(BinError::Server)?;

        if let Some(user) = bootstrap_root_admin(&self.stores, &root_admin(&self.config))
            .await
            .map_err(BinError::Bootstrap)?
        {
            info!(email = %user.email, "Root admin ready");
        }

        let purge = spawn_revocation_purge(
            server.state().tokens().clone(),
            self.config.security.purge_interval,
            &self.shutdown,
        );

        let signals = self.shutdown.clone();
        tokio::spawn(async move { signals.wait_for_shutdown().await });

        info!("Ward is ready (API: {})", server.addr());
        let result = server.run_with_shutdown(self.shutdown.shutdown_signal()).await;

        // The server may also stop on its own error.
        self.shutdown.initiate_shutdown();
        if let Err(e) = purge.await {
            warn!("Revocation purge task ended abnormally: {}", e);
        }

        info!("Ward shutdown complete");
        result.map_err(BinError::Server)
    }
}

// =============================================================================
// Configuration Mapping
// =============================================================================

/// Maps the file configuration onto the API server configuration.
pub fn api_config(config: &WardConfig) -> ApiConfig {
    let server = &config.server;
    let security = &config.security;

    let mut jwt = JwtConfig::new(
        security
            .secret
            .as_ref()
            .map(|s| s.expose().to_string())
            .unwrap_or_default(),
    )
    .with_issuer(security.issuer.clone())
    .with_session_ttl(security.session_ttl)
    .with_api_key_ttl(security.api_key_ttl);
    jwt.leeway_secs = security.leeway_secs;

    let mut api = ApiConfig::default()
        .with_host(server.bind_address)
        .with_port(server.port)
        .with_jwt(jwt)
        .with_registration(server.registration_enabled);
    api.request_timeout = server.request_timeout;
    api.max_body_size = server.max_body_size;
    api.cors = CorsConfig {
        enabled: server.cors.enabled,
        allowed_origins: server.cors.allowed_origins.clone(),
        allow_credentials: server.cors.allow_credentials,
        max_age: server.cors.max_age_secs,
    };
    api
}

/// Maps the root-admin section.
pub fn root_admin(config: &WardConfig) -> RootAdmin {
    let section = &config.root_admin;
    RootAdmin {
        group_name: section.group_name.clone(),
        username: section.username.clone(),
        email: section.email.clone(),
        password: section
            .password
            .as_ref()
            .map(|p| p.expose().to_string())
            .unwrap_or_default(),
    }
}

// =============================================================================
// Background Tasks
// =============================================================================

/// Drops expired revocation entries every `interval` until shutdown.
pub fn spawn_revocation_purge(
    tokens: TokenService,
    interval: Duration,
    shutdown: &ShutdownCoordinator,
) -> JoinHandle<()> {
    let mut stop = shutdown.subscribe();
    let stopped = shutdown.is_shutdown_initiated();

    tokio::spawn(async move {
        if stopped {
            return;
        }
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => match tokens.purge_revocations().await {
                    Ok(0) => {}
                    Ok(purged) => debug!(purged, "Purged expired revocations"),
                    Err(e) => warn!(error = %e, "Revocation purge failed"),
                },
                _ = stop.recv() => break,
            }
        }
        debug!("Revocation purge stopped");
    })
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
pub struct RuntimeBuilder {
    config: WardConfig,
    stores: Option<Stores>,
}

impl RuntimeBuilder {
    /// Starts from a loaded configuration.
    pub fn new(config: WardConfig) -> Self {
        Self {
            config,
            stores: None,
        }
    }

    /// Sets the stores.
    pub fn stores(mut self, stores: Stores) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> WardRuntime {
        let runtime = WardRuntime::new(self.config);
        match self.stores {
            Some(stores) => runtime.with_stores(stores),
            None => runtime,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use ward_config::SecretValue;
    use ward_core::{GroupStore, RevocationEntry, RevocationStore};

    fn test_config() -> WardConfig {
        let mut config = WardConfig::default();
        config.security.secret = Some(SecretValue::new("0123456789abcdef0123456789abcdef"));
        config.security.leeway_secs = 5;
        config.server.port = 9123;
        config.server.registration_enabled = true;
        config.server.cors.enabled = false;
        config.root_admin.password = Some(SecretValue::new("root-password"));
        config
    }

    #[tokio::test]
    async fn test_bootstrap_without_password_is_a_config_exit() {
        let mut config = test_config();
        config.root_admin.password = None;
        let stores = Stores::in_memory();

        let err = RuntimeBuilder::new(config)
            .stores(stores.clone())
            .build()
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, BinError::Bootstrap(_)));
        assert_eq!(err.exit_code(), crate::error::EX_CONFIG);
        assert_eq!(stores.groups.count().await.unwrap(), 0);
    }

    #[test]
    fn test_api_config_mapping() {
        let api = api_config(&test_config());
        assert_eq!(api.port, 9123);
        assert!(api.registration_enabled);
        assert!(!api.cors.enabled);
        assert_eq!(api.jwt.secret.len(), 32);
        assert_eq!(api.jwt.leeway_secs, 5);
    }

    #[test]
    fn test_root_admin_mapping() {
        let admin = root_admin(&test_config());
        assert_eq!(admin.username, "root");
        assert_eq!(admin.password, "root-password");
    }

    #[tokio::test]
    async fn test_purge_task_stops_on_shutdown() {
        let config = api_config(&test_config());
        let state = ward_api::AppState::builder().config(config).build().unwrap();
        let stores = state.stores().clone();

        stores
            .revocations
            .insert(RevocationEntry::new("sig", Utc::now() - ChronoDuration::seconds(1)))
            .await
            .unwrap();

        let shutdown = ShutdownCoordinator::new();
        let handle = spawn_revocation_purge(
            state.tokens().clone(),
            Duration::from_millis(10),
            &shutdown,
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stores.revocations.len().await.unwrap(), 0);

        shutdown.initiate_shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("purge task should stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_runtime_stops_on_shutdown() {
        let mut config = test_config();
        config.server.bind_address = "127.0.0.1".parse().unwrap();
        config.server.port = 0;

        let stores = Stores::in_memory();
        let runtime = RuntimeBuilder::new(config).stores(stores.clone()).build();
        let shutdown = runtime.shutdown().clone();

        let handle = tokio::spawn(runtime.run());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(stores.groups.count().await.unwrap(), 1);

        shutdown.initiate_shutdown();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runtime should stop")
            .unwrap()
            .unwrap();
    }
}
