// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Undecorated async client: every failure reaches the caller.

use crate::client::backend::{ClusterBackend, Document, Durability, MutationOptions};
use crate::client::keyspace::Keyspace;
use crate::client::managers::{CollectionManager, UserManager};
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

pub struct AsyncGen<B: ClusterBackend> {
    backend: B,
    collections: HashMap<String, Keyspace>,
}

impl<B: ClusterBackend> AsyncGen<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            collections: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn bucket(&self) -> &str {
        self.backend.bucket()
    }

    /// Register `scope:collection` targets for later data operations.
    pub fn connect_collections<S: AsRef<str>>(&mut self, targets: &[S]) -> Result<()> {
        for target in targets {
            let target = target.as_ref();
            let keyspace = Keyspace::resolve(self.backend.bucket(), target)?;
            debug!("Connected {} as {}", target, keyspace);
            self.collections.insert(target.to_string(), keyspace);
        }
        Ok(())
    }

    pub fn keyspace(&self, target: &str) -> Result<&Keyspace> {
        self.collections
            .get(target)
            .ok_or_else(|| Error::UnknownCollection(target.to_string()))
    }

    pub async fn create(&self, target: &str, key: &str, document: &Document, ttl: u64) -> Result<()> {
        self.upsert(target, key, document, MutationOptions::with_ttl(ttl))
            .await
    }

    pub async fn create_durable(
        &self,
        target: &str,
        key: &str,
        document: &Document,
        durability: Durability,
        ttl: u64,
    ) -> Result<()> {
        let options = MutationOptions::with_ttl(ttl).durable(durability);
        self.upsert(target, key, document, options).await
    }

    pub async fn read(&self, target: &str, key: &str) -> Result<Document> {
        self.backend.get(self.keyspace(target)?, key).await
    }

    pub async fn update(&self, target: &str, key: &str, document: &Document, ttl: u64) -> Result<()> {
        self.create(target, key, document, ttl).await
    }

    pub async fn update_durable(
        &self,
        target: &str,
        key: &str,
        document: &Document,
        durability: Durability,
        ttl: u64,
    ) -> Result<()> {
        self.create_durable(target, key, document, durability, ttl)
            .await
    }

    pub async fn delete(&self, target: &str, key: &str) -> Result<()> {
        self.backend.remove(self.keyspace(target)?, key).await
    }

    pub fn users(&self) -> UserManager<'_, B> {
        UserManager::new(&self.backend)
    }

    pub fn collections(&self) -> CollectionManager<'_, B> {
        CollectionManager::new(&self.backend)
    }

    async fn upsert(&self, target: &str, key: &str, document: &Document, options: MutationOptions) -> Result<()> {
        self.backend
            .upsert(self.keyspace(target)?, key, document, &options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::MemoryCluster;
    use serde_json::json;
    use std::time::Duration;

    fn make_gen() -> AsyncGen<MemoryCluster> {
        let mut client = AsyncGen::new(MemoryCluster::new("bucket-1"));
        client.connect_collections(&["_default:_default"]).unwrap();
        client
    }

    #[tokio::test]
    async fn test_default_pair_maps_to_default_collection() {
        let client = make_gen();

        let keyspace = client.keyspace("_default:_default").unwrap();

        assert!(keyspace.is_default());
        assert_eq!(*keyspace, Keyspace::default_collection("bucket-1"));
    }

    #[tokio::test]
    async fn test_unconnected_target_is_rejected() {
        let client = make_gen();

        let result = client.read("scope-1:collection-1", "k1").await;

        assert!(matches!(result, Err(Error::UnknownCollection(_))));
    }

    #[tokio::test]
    async fn test_create_with_ttl() {
        let client = make_gen();

        client
            .create("_default:_default", "k1", &json!({"v": 1}), 30)
            .await
            .unwrap();

        let stored = client
            .backend()
            .stored(&Keyspace::default_collection("bucket-1"), "k1")
            .unwrap();
        assert_eq!(stored.options.expiry, Some(Duration::from_secs(30)));
        assert_eq!(stored.options.durability, Durability::None);
    }

    #[tokio::test]
    async fn test_update_durable() {
        let client = make_gen();

        client
            .update_durable("_default:_default", "k1", &json!(2), Durability::Majority, 0)
            .await
            .unwrap();

        let stored = client
            .backend()
            .stored(&Keyspace::default_collection("bucket-1"), "k1")
            .unwrap();
        assert_eq!(stored.options.durability, Durability::Majority);
        assert_eq!(stored.options.expiry, None);
        assert_eq!(client.read("_default:_default", "k1").await.unwrap(), json!(2));
    }

    #[tokio::test]
    async fn test_errors_are_not_suppressed() {
        let client = make_gen();

        let result = client.delete("_default:_default", "missing").await;

        assert!(matches!(result, Err(Error::DocumentNotFound(_))));
    }
}
