// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::client::{DEFAULT_COLLECTION, DEFAULT_SCOPE};
use crate::error::{Error, Result};
use std::fmt;

/// Bucket, scope and collection a document lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyspace {
    pub bucket: String,
    pub scope: String,
    pub collection: String,
}

impl Keyspace {
    pub fn default_collection(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }

    /// Resolve a `scope:collection` target within `bucket`.
    pub fn resolve(bucket: &str, target: &str) -> Result<Self> {
        let (scope, collection) = target
            .split_once(':')
            .filter(|(s, c)| !s.is_empty() && !c.is_empty() && !c.contains(':'))
            .ok_or_else(|| {
                Error::InvalidKeyspace(format!("{target}, expected scope:collection"))
            })?;

        if scope == DEFAULT_SCOPE && collection == DEFAULT_COLLECTION {
            return Ok(Self::default_collection(bucket));
        }
        Ok(Self {
            bucket: bucket.to_string(),
            scope: scope.to_string(),
            collection: collection.to_string(),
        })
    }

    pub fn is_default(&self) -> bool {
        self.scope == DEFAULT_SCOPE && self.collection == DEFAULT_COLLECTION
    }

    /// Keyspace reference for N1QL statements. The default collection is addressed through its bucket.
    pub fn n1ql_path(&self) -> String {
        if self.is_default() {
            format!("`{}`", self.bucket)
        } else {
            format!("`{}`.`{}`.`{}`", self.bucket, self.scope, self.collection)
        }
    }
}

impl fmt::Display for Keyspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.bucket, self.scope, self.collection)
    }
}
