// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::Extra;
use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "couchbase.com", version = "v2", kind = "CouchbaseCluster")]
#[kube(namespaced)]
#[kube(derive = "Default")]
#[kube(derive = "PartialEq")]
#[serde(rename_all = "camelCase")]
pub struct CouchbaseClusterSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<ServerGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<BackupSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<MonitoringSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterConfigSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networking: Option<NetworkingSettings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_claim_templates: Vec<VolumeClaimTemplate>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl CouchbaseCluster {
    /// Find a server group by name
    pub fn server_group(&self, name: &str) -> Option<&ServerGroup> {
        self.spec.servers.iter().find(|g| g.name == name)
    }

    /// Name of the autoscaler resource the operator creates for a server group
    pub fn autoscaler_name(&self, server_group: &str) -> String {
        format!("{}.{}", server_group, self.name_any())
    }
}

/// A named set of pods running the same services
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<PodTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_mounts: Option<VolumeMounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale_enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ServerGroup {
    /// Set one resource limit, keeping the others.
    pub fn set_limit(&mut self, resource: &str, quantity: Quantity) {
        self.resources
            .get_or_insert_with(Default::default)
            .limits
            .get_or_insert_with(Default::default)
            .insert(resource.to_string(), quantity);
    }

    pub fn limit(&self, resource: &str) -> Option<&Quantity> {
        self.resources
            .as_ref()
            .and_then(|r| r.limits.as_ref())
            .and_then(|l| l.get(resource))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplate {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSettings,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodSettings {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_pull_secrets: Vec<SecretReference>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct SecretReference {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct VolumeMounts {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeClaimTemplate {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: VolumeClaimSpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeClaimSpec {
    #[serde(default)]
    pub resources: StorageResources,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct StorageResources {
    #[serde(default)]
    pub requests: BTreeMap<String, Quantity>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<PrometheusSettings>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u32>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Cluster-wide settings under `spec.cluster`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfigSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_service_memory_quota: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_service_memory_quota: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_service_memory_quota: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics_service_memory_quota: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eventing_service_memory_quota: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_storage_setting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_failover_max_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_failover_server_group: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_failover_on_data_disk_issues: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_failover_on_data_disk_issues_time_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_failover_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_compaction: Option<AutoCompaction>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutoCompaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_fragmentation_threshold: Option<FragmentationThreshold>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_fragmentation_threshold: Option<FragmentationThreshold>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_compaction: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct FragmentationThreshold {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<u32>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_native_gateway: Option<CloudNativeGateway>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct CloudNativeGateway {
    pub image: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLUSTER_YAML: &str = r#"
apiVersion: couchbase.com/v2
kind: CouchbaseCluster
metadata:
  name: cb-example-perf
spec:
  image: couchbase/server:7.2.4
  security:
    adminSecret: cb-example-auth
  servers:
    - name: data
      services: [data]
      volumeMounts:
        default: data
  cluster:
    dataServiceMemoryQuota: 256Mi
    clusterName: cb-example-perf
"#;

    fn make_cluster() -> CouchbaseCluster {
        serde_yaml::from_str(CLUSTER_YAML).unwrap()
    }

    #[test]
    fn test_unmodelled_keys_survive_round_trip() {
        let cluster = make_cluster();

        let yaml = serde_yaml::to_string(&cluster).unwrap();
        let reparsed: CouchbaseCluster = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(reparsed, cluster);
        assert!(yaml.contains("adminSecret: cb-example-auth"));
        assert!(yaml.contains("clusterName: cb-example-perf"));
    }

    #[test]
    fn test_unset_size_stays_absent() {
        let cluster = make_cluster();

        assert_eq!(cluster.spec.servers[0].size, None);
        assert!(!serde_yaml::to_string(&cluster).unwrap().contains("size:"));
    }

    #[test]
    fn test_server_group_lookup() {
        let cluster = make_cluster();

        assert!(cluster.server_group("data").is_some());
        assert!(cluster.server_group("index").is_none());
    }

    #[test]
    fn test_autoscaler_name() {
        assert_eq!(make_cluster().autoscaler_name("data"), "data.cb-example-perf");
    }

    #[test]
    fn test_set_limit_keeps_existing_limits() {
        let mut group = ServerGroup::default();

        group.set_limit("cpu", Quantity("8".to_string()));
        group.set_limit("memory", Quantity("2048Mi".to_string()));

        assert_eq!(group.limit("cpu"), Some(&Quantity("8".to_string())));
        assert_eq!(group.limit("memory"), Some(&Quantity("2048Mi".to_string())));
    }
}
