// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::client::keyspace::Keyspace;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A JSON document body
pub type Document = serde_json::Value;

/// Minimum replication/persistence a mutation waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    #[default]
    None,
    Majority,
    MajorityAndPersistToActive,
    PersistToMajority,
}

impl Durability {
    /// Name of the level as the query service expects it
    pub fn as_str(self) -> &'static str {
        match self {
            Durability::None => "none",
            Durability::Majority => "majority",
            Durability::MajorityAndPersistToActive => "majorityAndPersistActive",
            Durability::PersistToMajority => "persistToMajority",
        }
    }
}

impl TryFrom<u8> for Durability {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            0 => Ok(Durability::None),
            1 => Ok(Durability::Majority),
            2 => Ok(Durability::MajorityAndPersistToActive),
            3 => Ok(Durability::PersistToMajority),
            other => Err(Error::InvalidDurability(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationOptions {
    pub expiry: Option<Duration>,
    pub durability: Durability,
}

impl MutationOptions {
    /// A TTL of zero means the document never expires.
    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            expiry: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
            durability: Durability::None,
        }
    }

    pub fn durable(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanConsistency {
    NotBounded,
    RequestPlus,
}

impl ScanConsistency {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanConsistency::NotBounded => "not_bounded",
            ScanConsistency::RequestPlus => "request_plus",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub positional: Vec<serde_json::Value>,
    pub named: BTreeMap<String, serde_json::Value>,
    pub scan_consistency: Option<ScanConsistency>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewQuery {
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    /// `false` forces an index update before the query
    pub stale: Option<bool>,
    pub key: Option<serde_json::Value>,
}

impl ViewQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(skip) = self.skip {
            params.push(("skip", skip.to_string()));
        }
        if let Some(stale) = self.stale {
            params.push(("stale", if stale { "ok" } else { "false" }.to_string()));
        }
        if let Some(key) = &self.key {
            params.push(("key", key.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub key: serde_json::Value,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewResult {
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub rows: Vec<ViewRow>,
}

/// An RBAC role, optionally scoped to a bucket: `bucket_admin[bucket-1]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub bucket: Option<String>,
}

impl Role {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bucket: None,
        }
    }

    pub fn on_bucket(name: &str, bucket: &str) -> Self {
        Self {
            name: name.to_string(),
            bucket: Some(bucket.to_string()),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('[') {
            Some((name, rest)) => {
                let bucket = rest
                    .strip_suffix(']')
                    .ok_or_else(|| Error::Management(format!("malformed role {s}")))?;
                Ok(Role::on_bucket(name, bucket))
            }
            None => Ok(Role::new(s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bucket {
            Some(bucket) => write!(f, "{}[{}]", self.name, bucket),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub roles: Vec<Role>,
}

/// Entry of the role listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleAndDescription {
    pub role: String,
    #[serde(default)]
    pub bucket_name: Option<String>,
    #[serde(rename = "name", default)]
    pub display_name: String,
    #[serde(rename = "desc", default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    pub scope_name: String,
    pub collection_name: String,
}

impl CollectionSpec {
    pub fn new(scope_name: &str, collection_name: &str) -> Self {
        Self {
            scope_name: scope_name.to_string(),
            collection_name: collection_name.to_string(),
        }
    }
}

/// Data and management operations against one bucket of a cluster.
#[async_trait::async_trait]
pub trait ClusterBackend: Send + Sync {
    /// Name of the bucket the backend is bound to.
    fn bucket(&self) -> &str;

    async fn upsert(
        &self,
        keyspace: &Keyspace,
        key: &str,
        document: &Document,
        options: &MutationOptions,
    ) -> Result<()>;

    /// Fails with `Error::DocumentNotFound` for a missing key.
    async fn get(&self, keyspace: &Keyspace, key: &str) -> Result<Document>;

    /// Fails with `Error::DocumentNotFound` for a missing key.
    async fn remove(&self, keyspace: &Keyspace, key: &str) -> Result<()>;

    async fn query(&self, statement: &str, options: &QueryOptions) -> Result<Vec<Document>>;

    async fn view_query(&self, design_doc: &str, view: &str, query: &ViewQuery) -> Result<ViewResult>;

    async fn upsert_user(&self, user: &User) -> Result<()>;

    async fn get_roles(&self) -> Result<Vec<RoleAndDescription>>;

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<()>;

    async fn drop_collection(&self, spec: &CollectionSpec) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durability_levels() {
        assert_eq!(Durability::try_from(0).unwrap(), Durability::None);
        assert_eq!(Durability::try_from(3).unwrap(), Durability::PersistToMajority);
        assert!(matches!(Durability::try_from(4), Err(Error::InvalidDurability(4))));
        assert_eq!(Durability::MajorityAndPersistToActive.as_str(), "majorityAndPersistActive");
    }

    #[test]
    fn test_zero_ttl_has_no_expiry() {
        assert_eq!(MutationOptions::with_ttl(0).expiry, None);
        assert_eq!(MutationOptions::with_ttl(30).expiry, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_role_parsing() {
        let role: Role = "bucket_admin[bucket-1]".parse().unwrap();
        assert_eq!(role, Role::on_bucket("bucket_admin", "bucket-1"));
        assert_eq!(role.to_string(), "bucket_admin[bucket-1]");

        assert_eq!("admin".parse::<Role>().unwrap(), Role::new("admin"));
        assert!("data_reader[bucket-1".parse::<Role>().is_err());
    }

    #[test]
    fn test_view_query_params() {
        let query = ViewQuery {
            limit: Some(10),
            stale: Some(false),
            key: Some(serde_json::json!("k1")),
            ..Default::default()
        };

        assert_eq!(
            query.params(),
            vec![
                ("limit", "10".to_string()),
                ("stale", "false".to_string()),
                ("key", "\"k1\"".to_string()),
            ]
        );
    }
}
