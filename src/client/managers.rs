// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::client::backend::{ClusterBackend, CollectionSpec, Role, RoleAndDescription, User};
use crate::error::Result;
use tracing::debug;

/// RBAC user administration on the connected cluster
pub struct UserManager<'a, B: ClusterBackend> {
    backend: &'a B,
}

impl<'a, B: ClusterBackend> UserManager<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub async fn upsert_user(&self, username: &str, roles: &[Role], password: &str) -> Result<()> {
        debug!("Upserting user {} with {} roles", username, roles.len());
        let user = User {
            username: username.to_string(),
            password: Some(password.to_string()),
            display_name: None,
            roles: roles.to_vec(),
        };
        self.backend.upsert_user(&user).await
    }

    pub async fn get_roles(&self) -> Result<Vec<RoleAndDescription>> {
        self.backend.get_roles().await
    }
}

/// Collection administration on the bound bucket
pub struct CollectionManager<'a, B: ClusterBackend> {
    backend: &'a B,
}

impl<'a, B: ClusterBackend> CollectionManager<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub async fn create_collection(&self, scope: &str, collection: &str) -> Result<()> {
        self.backend
            .create_collection(&CollectionSpec::new(scope, collection))
            .await
    }

    pub async fn drop_collection(&self, scope: &str, collection: &str) -> Result<()> {
        self.backend
            .drop_collection(&CollectionSpec::new(scope, collection))
            .await
    }
}
