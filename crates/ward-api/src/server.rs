// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::auth::AccessTable;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::GateLayer;
use crate::state::{AppState, Stores};

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let cors = self.config.cors.enabled.then(|| create_cors_layer(&self.config));
        let gate = GateLayer::new(self.state.gate().clone());

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .option_layer(cors)
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .layer(gate);

        Router::new()
            // Health endpoints (public)
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            // AuthService
            .route("/authService.AuthService/Register", post(handlers::register))
            .route("/authService.AuthService/Login", post(handlers::login))
            .route("/authService.AuthService/Logout", post(handlers::logout))
            .route("/authService.AuthService/Refresh", post(handlers::refresh))
            .route("/authService.AuthService/GenerateKey", post(handlers::generate_key))
            .route(
                "/authService.AuthService/UpdatePassword",
                post(handlers::update_password),
            )
            // UserService
            .route("/usersService.UserService/Create", post(handlers::create_user))
            .route("/usersService.UserService/Update", post(handlers::update_user))
            .route("/usersService.UserService/Get", post(handlers::get_user))
            .route("/usersService.UserService/Find", post(handlers::find_users))
            .route(
                "/usersService.UserService/GetGroupUsers",
                post(handlers::get_group_users),
            )
            .route("/usersService.UserService/Delete", post(handlers::delete_user))
            // GroupService
            .route("/groupsService.GroupService/Create", post(handlers::create_group))
            .route("/groupsService.GroupService/Update", post(handlers::update_group))
            .route("/groupsService.GroupService/Get", post(handlers::get_group))
            .route("/groupsService.GroupService/Find", post(handlers::find_groups))
            .route("/groupsService.GroupService/Delete", post(handlers::delete_group))
            // TaskService
            .route("/tasksService.TaskService/Create", post(handlers::create_task))
            .route("/tasksService.TaskService/Update", post(handlers::update_task))
            .route("/tasksService.TaskService/Get", post(handlers::get_task))
            .route("/tasksService.TaskService/Find", post(handlers::find_tasks))
            .route(
                "/tasksService.TaskService/GetGroupTasks",
                post(handlers::get_group_tasks),
            )
            .route(
                "/tasksService.TaskService/GetUserTasks",
                post(handlers::get_user_tasks),
            )
            .route("/tasksService.TaskService/Delete", post(handlers::delete_task))
            // Apply middleware and state
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::service_unavailable(format!("cannot bind {}: {}", addr, e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = &config.cors;

    let mut layer = CorsLayer::new()
        .max_age(Duration::from_secs(cors.max_age))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if cors.allows_any_origin() {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
        // Credentials cannot be combined with a wildcard origin.
        if cors.allow_credentials {
            layer = layer.allow_credentials(true);
        }
    }

    layer
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
#[derive(Default)]
pub struct ApiServerBuilder {
    state_builder: crate::state::AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the stores.
    pub fn stores(mut self, stores: Stores) -> Self {
        self.state_builder = self.state_builder.stores(stores);
        self
    }

    /// Replaces the default method table.
    pub fn access_table(mut self, table: AccessTable) -> Self {
        self.state_builder = self.state_builder.access_table(table);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

// =============================================================================
// Tests
// =============================================================================
