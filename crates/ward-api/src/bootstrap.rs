// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! First-start provisioning of the root-admin group and user.

use tracing::{info, warn};
use ward_core::{Group, GroupStore, Role, User, UserStore};

use crate::auth::password::hash_password;
use crate::config::RootAdmin;
use crate::error::{ApiError, ApiResult};
use crate::state::Stores;

/// Creates the root-admin group and its root user when no group exists yet.
///
/// Returns the created user, or `None` if the stores were already
/// provisioned.
pub async fn bootstrap_root_admin(stores: &Stores, admin: &RootAdmin) -> ApiResult<Option<User>> {
    if stores.groups.count().await? > 0 {
        return Ok(None);
    }

    if admin.password.is_empty() {
        return Err(ApiError::validation(
            "root admin password must be set to provision an empty store",
        ));
    }

    let group = stores.groups.create(Group::root(&admin.group_name)).await?;
    let hash = hash_password(&admin.password)?;
    let user = User::new(&admin.username, admin.email.trim().to_lowercase(), hash, group.id.clone(), Role::Root);

    match stores.users.create(user).await {
        Ok(user) => {
            info!(
                group_id = %group.id,
                user_id = %user.id,
                username = %user.username,
                "Provisioned root admin"
            );
            Ok(Some(user))
        }
        Err(e) => {
            warn!(error = %e, "Root admin creation failed, removing root group");
            let _ = stores.groups.delete(&group.id).await;
            Err(e.into())
        }
    }
}
