// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! A seeded world of two tenants plus the root-admin group:
//!
//! ```text
//! root  (root_admin)   root      Role::Root
//! G1                   U1        Role::Admin
//!                      U2        Role::Member   image file, task T1
//! G2                   U3        Role::Admin    task T2
//! ```
//!
//! Every user shares [`TEST_PASSWORD`].

use std::time::Duration;

use ward_api::auth::password::hash_password;
use ward_api::{
    ApiConfig, ApiServer, ApiServerBuilder, AppState, JwtConfig, TokenClaims, TokenKind,
};
use ward_core::{
    File, FileStore, Group, GroupStore, OwnerType, Role, Task, TaskStore, User, UserStore,
};

use super::builders::{TaskBuilder, UserBuilder};
use super::mocks::MockStores;

/// Signing secret used by every test server.
pub const TEST_SECRET: &str = "ward-integration-test-secret-0123456789abcdef";

/// Password of every seeded user.
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// JWT settings for tests.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_SECRET).with_issuer("ward-tests")
}

/// API configuration with registration enabled.
pub fn test_api_config() -> ApiConfig {
    ApiConfig::default()
        .with_jwt(test_jwt_config())
        .with_registration(true)
}

/// Claims for `user` valid for an hour.
pub fn claims_for(user: &User) -> TokenClaims {
    TokenClaims::for_user(user, Duration::from_secs(3600))
}

// =============================================================================
// World
// =============================================================================

/// The seeded tenants together with a server running against them.
pub struct World {
    pub mocks: MockStores,
    pub server: ApiServer,
    pub root_group: Group,
    pub root: User,
    pub g1: Group,
    /// Admin of G1.
    pub u1: User,
    /// Member of G1.
    pub u2: User,
    /// Task of U2.
    pub t1: Task,
    pub g2: Group,
    /// Admin of G2.
    pub u3: User,
    /// Task of U3.
    pub t2: Task,
    /// Profile image of U2.
    pub image: File,
}

impl World {
    /// Seeds the world with [`test_api_config`].
    pub async fn seed() -> Self {
        Self::seed_with(test_api_config()).await
    }

    /// Seeds the world behind a server built from `config`.
    pub async fn seed_with(config: ApiConfig) -> Self {
        let mocks = MockStores::new();
        let memory = &mocks.memory;
        let hash = hash_password(TEST_PASSWORD).expect("hash test password");

        let root_group = memory
            .groups
            .create(Group::root("root"))
            .await
            .expect("seed root group");
        let root = memory
            .users
            .create(
                UserBuilder::new(root_group.id.clone())
                    .username("root")
                    .email("root@ward.test")
                    .password_hash(&hash)
                    .role(Role::Root)
                    .build(),
            )
            .await
            .expect("seed root");

        let g1 = memory.groups.create(Group::new("G1")).await.expect("seed G1");
        let u1 = memory
            .users
            .create(
                UserBuilder::new(g1.id.clone())
                    .username("u1")
                    .email("u1@g1.test")
                    .password_hash(&hash)
                    .admin()
                    .build(),
            )
            .await
            .expect("seed U1");

        let u2 = UserBuilder::new(g1.id.clone())
            .username("u2")
            .email("u2@g1.test")
            .password_hash(&hash)
            .build();
        let image = memory
            .files
            .create(
                File::new(OwnerType::User, u2.id.as_str(), "avatar.png", 4),
                vec![1, 2, 3, 4],
            )
            .await
            .expect("seed image");
        let u2 = memory
            .users
            .create(u2.with_image(image.id.clone()))
            .await
            .expect("seed U2");
        let t1 = memory
            .tasks
            .create(TaskBuilder::for_user(&u2).name("T1").build())
            .await
            .expect("seed T1");

        let g2 = memory.groups.create(Group::new("G2")).await.expect("seed G2");
        let u3 = memory
            .users
            .create(
                UserBuilder::new(g2.id.clone())
                    .username("u3")
                    .email("u3@g2.test")
                    .password_hash(&hash)
                    .admin()
                    .build(),
            )
            .await
            .expect("seed U3");
        let t2 = memory
            .tasks
            .create(TaskBuilder::for_user(&u3).name("T2").build())
            .await
            .expect("seed T2");

        let server = ApiServerBuilder::new()
            .config(config)
            .stores(mocks.stores())
            .build()
            .expect("build test server");

        Self {
            mocks,
            server,
            root_group,
            root,
            g1,
            u1,
            u2,
            t1,
            g2,
            u3,
            t2,
            image,
        }
    }

    pub fn state(&self) -> &AppState {
        self.server.state()
    }

    /// A fresh session token for `user`.
    pub fn token(&self, user: &User) -> String {
        self.state()
            .tokens()
            .issue_token(user, TokenKind::Session)
            .expect("issue test token")
    }

    /// An API key for `user`.
    pub fn api_key(&self, user: &User) -> String {
        self.state()
            .tokens()
            .issue_token(user, TokenKind::Api)
            .expect("issue test api key")
    }
}
