// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # API Integration Tests
//!
//! The RPC surface driven through the full router: gate, handlers, services
//! and stores together.
//!
//! ## Test Categories
//!
//! - `test_api_auth_*`: Register, login, logout, refresh and keys
//! - `test_api_tenant_*`: Tenant isolation across the services
//! - `test_api_delete_*`: Cascading deletes over HTTP
//! - `test_api_health_*`: Liveness and readiness

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use ward_tests::common::*;
use ward_core::FileStore;

const AUTH: &str = "/authService.AuthService";
const USERS: &str = "/usersService.UserService";
const GROUPS: &str = "/groupsService.GroupService";
const TASKS: &str = "/tasksService.TaskService";

/// Posts `body` to `path` and returns the status and decoded body.
async fn call(router: &Router, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn method(service: &str, name: &str) -> String {
    format!("{}/{}", service, name)
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_api_auth_login_and_use_session() {
    init_test_logging();
    let world = World::seed().await;
    let router = world.server.router();

    let (status, body) = call(
        &router,
        &method(AUTH, "Login"),
        None,
        json!({ "email": "U2@g1.test", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], world.u2.id.as_str());
    assert!(body["data"]["user"].get("password_hash").is_none());
    assert_eq!(body["data"]["token_type"], "Bearer");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = call(&router, &method(TASKS, "Find"), Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], world.t1.id.as_str());
}

#[tokio::test]
async fn test_api_auth_login_failures_are_indistinguishable() {
    let world = World::seed().await;
    let router = world.server.router();

    let (wrong_password, body_a) = call(
        &router,
        &method(AUTH, "Login"),
        None,
        json!({ "email": "u2@g1.test", "password": "nope" }),
    )
    .await;
    let (unknown_email, body_b) = call(
        &router,
        &method(AUTH, "Login"),
        None,
        json!({ "email": "ghost@g1.test", "password": "nope" }),
    )
    .await;
    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a["error"]["message"], body_b["error"]["message"]);
}

#[tokio::test]
async fn test_api_auth_logout_revokes_token() {
    let world = World::seed().await;
    let router = world.server.router();
    let token = world.token(&world.u2);

    let (status, _) = call(&router, &method(AUTH, "Logout"), Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&router, &method(TASKS, "Find"), Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("access token is invalid"));
}

#[tokio::test]
async fn test_api_auth_refresh_and_generate_key() {
    let world = World::seed().await;
    let router = world.server.router();
    let token = world.token(&world.u1);

    let (status, body) = call(&router, &method(AUTH, "Refresh"), Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["expires_in"], 3600);
    let refreshed = body["data"]["token"].as_str().unwrap().to_string();
    assert_ne!(refreshed, token);

    let (status, body) =
        call(&router, &method(AUTH, "GenerateKey"), Some(&refreshed), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["expires_in"], 4380 * 3600);

    let key = body["data"]["token"].as_str().unwrap();
    let (status, _) = call(&router, &method(GROUPS, "Find"), Some(key), json!({})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_api_auth_register_creates_admin_tenant() {
    let world = World::seed().await;
    let router = world.server.router();
    let request = json!({ "email": "Founder@Startup.test", "password": "s3cret-pass" });

    let (status, body) = call(&router, &method(AUTH, "Register"), None, request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert_eq!(body["data"]["user"]["email"], "founder@startup.test");

    let token = body["data"]["token"].as_str().unwrap();
    let (status, body) = call(&router, &method(GROUPS, "Find"), Some(token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "founder@startup.test_group");

    let (status, _) = call(&router, &method(AUTH, "Register"), None, request).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_api_auth_register_disabled() {
    let world = World::seed_with(test_api_config().with_registration(false)).await;
    let (status, _) = call(
        &world.server.router(),
        &method(AUTH, "Register"),
        None,
        json!({ "email": "a@b.test", "password": "pw" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_auth_update_password() {
    let world = World::seed().await;
    let router = world.server.router();
    let token = world.token(&world.u3);

    let (status, _) = call(
        &router,
        &method(AUTH, "UpdatePassword"),
        Some(&token),
        json!({ "current_password": "wrong", "new_password": "fresh-password" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &router,
        &method(AUTH, "UpdatePassword"),
        Some(&token),
        json!({ "current_password": TEST_PASSWORD, "new_password": "fresh-password" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &router,
        &method(AUTH, "Login"),
        None,
        json!({ "email": "u3@g2.test", "password": "fresh-password" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Tenant isolation
// =============================================================================

#[tokio::test]
async fn test_api_tenant_member_sees_only_own_tasks() {
    let world = World::seed().await;
    let router = world.server.router();
    let token = world.token(&world.u2);

    let (status, _) = call(
        &router,
        &method(TASKS, "Get"),
        Some(&token),
        json!({ "id": world.t2.id }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &router,
        &method(TASKS, "Create"),
        Some(&token),
        json!({
            "name": "write report",
            "due": "2031-01-01T00:00:00Z",
            "user_id": world.u3.id,
            "group_id": world.g2.id,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], world.u2.id.as_str());
    assert_eq!(body["data"]["group_id"], world.g1.id.as_str());
    assert_eq!(body["data"]["status"], "not_started");

    let (status, body) = call(
        &router,
        &method(TASKS, "GetUserTasks"),
        Some(&token),
        json!({ "user_id": world.u2.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
}

#[tokio::test]
async fn test_api_tenant_admin_is_confined_to_group() {
    let world = World::seed().await;
    let router = world.server.router();
    let token = world.token(&world.u1);

    let (status, body) = call(
        &router,
        &method(USERS, "Find"),
        Some(&token),
        json!({ "group_id": world.g2.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);

    let (status, _) = call(
        &router,
        &method(TASKS, "GetGroupTasks"),
        Some(&token),
        json!({ "group_id": world.g2.id }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &router,
        &method(USERS, "GetGroupUsers"),
        Some(&token),
        json!({ "group_id": world.g1.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["users"].as_array().unwrap().len(), 2);

    let (status, _) = call(
        &router,
        &method(USERS, "Get"),
        Some(&token),
        json!({ "id": world.u3.id }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_api_tenant_cannot_claim_foreign_image() {
    let world = World::seed().await;
    let router = world.server.router();
    let token = world.token(&world.u3);

    let (status, body) = call(
        &router,
        &method(USERS, "Update"),
        Some(&token),
        json!({ "id": world.u3.id, "image_id": world.image.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("image_id").is_none());

    let (status, _) = call(
        &router,
        &method(USERS, "Delete"),
        Some(&token),
        json!({ "id": world.u3.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let memory = &world.mocks.memory;
    assert!(memory
        .files
        .find(&ward_core::FileFilter::by_id(world.image.id.clone()))
        .await
        .is_ok());
    assert_eq!(memory.blobs.blob_count(), 1);
}

#[tokio::test]
async fn test_api_tenant_email_update_is_normalized() {
    let world = World::seed().await;
    let router = world.server.router();
    let admin = world.token(&world.u1);

    let (status, _) = call(
        &router,
        &method(USERS, "Update"),
        Some(&admin),
        json!({ "id": world.u2.id, "email": "U1@G1.TEST" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &router,
        &method(USERS, "Update"),
        Some(&admin),
        json!({ "id": world.u2.id, "email": "  Uma.Renamed@G1.Test " }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "uma.renamed@g1.test");

    let (status, _) = call(
        &router,
        &method(AUTH, "Login"),
        None,
        json!({ "email": "UMA.RENAMED@g1.test", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_api_tenant_role_gate() {
    let world = World::seed().await;
    let router = world.server.router();

    let (status, _) = call(
        &router,
        &method(USERS, "Create"),
        Some(&world.token(&world.u2)),
        json!({ "username": "x", "email": "x@g1.test", "password": "pw" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &router,
        &method(GROUPS, "Create"),
        Some(&world.token(&world.u1)),
        json!({ "name": "G3" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &router,
        &method(GROUPS, "Create"),
        Some(&world.token(&world.root)),
        json!({ "name": "G3" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "G3");
    assert_eq!(body["data"]["root_admin"], false);

    let (status, _) = call(&router, &method(GROUPS, "Find"), None, json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_tenant_malformed_body() {
    let world = World::seed().await;
    let router = world.server.router();
    let request = Request::builder()
        .method("POST")
        .uri(method(TASKS, "Get"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, world.token(&world.u1))
        .body(Body::from("{ not json"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_api_delete_group_cascades_and_invalidates_tokens() {
    let world = World::seed().await;
    let router = world.server.router();
    let member_token = world.token(&world.u2);
    let root_token = world.token(&world.root);

    let (status, body) = call(
        &router,
        &method(GROUPS, "Delete"),
        Some(&root_token),
        json!({ "id": world.g1.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], world.g1.id.as_str());
    let removed: u64 = body["data"]["removed"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["count"].as_u64().unwrap())
        .sum();
    assert_eq!(removed, 4);

    let (status, _) = call(&router, &method(TASKS, "Find"), Some(&member_token), json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&router, &method(TASKS, "Find"), Some(&root_token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
}

#[tokio::test]
async fn test_api_delete_group_failure_reports_server_error() {
    let world = World::seed().await;
    let router = world.server.router();
    world.mocks.tasks.switch.set_fail_writes(true);

    let (status, body) = call(
        &router,
        &method(GROUPS, "Delete"),
        Some(&world.token(&world.root)),
        json!({ "id": world.g1.id }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("group_tasks"));
}

#[tokio::test]
async fn test_api_delete_task_and_user() {
    let world = World::seed().await;
    let router = world.server.router();
    let admin = world.token(&world.u1);

    let (status, body) = call(
        &router,
        &method(TASKS, "Delete"),
        Some(&admin),
        json!({ "id": world.t1.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], world.t1.id.as_str());

    let (status, _) = call(
        &router,
        &method(TASKS, "Get"),
        Some(&admin),
        json!({ "id": world.t1.id }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &router,
        &method(USERS, "Delete"),
        Some(&admin),
        json!({ "id": world.u2.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &router,
        &method(USERS, "Delete"),
        Some(&world.token(&world.u3)),
        json!({ "id": world.u1.id }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_api_health_and_readiness() {
    let world = World::seed().await;
    let router = world.server.router();

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["ready"], true);
    assert_eq!(body["groups"], 3);
}
