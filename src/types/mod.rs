// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed records for the manifests the harness renders.

pub mod backup;
pub mod bucket;
pub mod cluster;
pub mod manifest;

use std::collections::BTreeMap;

/// Template keys the records do not model, carried through load and write untouched
pub type Extra = BTreeMap<String, serde_json::Value>;

pub use backup::{BackupSchedule, CouchbaseBackup, CouchbaseBackupSpec};
pub use bucket::{CouchbaseBucket, CouchbaseBucketSpec};
pub use cluster::{CouchbaseCluster, CouchbaseClusterSpec};
pub use manifest::Manifest;
