// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::Extra;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "couchbase.com", version = "v2", kind = "CouchbaseBackup")]
#[kube(namespaced)]
#[kube(derive = "Default")]
#[kube(derive = "PartialEq")]
#[serde(rename_all = "camelCase")]
pub struct CouchbaseBackupSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<BackupSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incremental: Option<BackupSchedule>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Cron-style schedule of one backup kind
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct BackupSchedule {
    pub schedule: String,
    #[serde(flatten)]
    pub extra: Extra,
}
