// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{annotations, defaults, templates};
use crate::error::{Error, Result};
use crate::files::{supported_for, ConfigFile, ManagedFile, VersionGate, Versioned};
use crate::operator::services::{to_harness_service, to_operator_service, volume_size_to_quantity};
use crate::operator::OperatorPaths;
use crate::settings::{ClusterSpec, TestConfig};
use crate::types::cluster::{
    AutoCompaction, CloudNativeGateway, ClusterConfigSpec, CouchbaseCluster, FragmentationThreshold,
    PodSettings, PodTemplate, SecretReference, ServerGroup, StorageResources, VolumeClaimSpec,
    VolumeClaimTemplate, VolumeMounts,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use semver::Version;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// The `CouchbaseCluster` manifest, populated from the cluster spec and test config.
pub struct CouchbaseClusterFile<'a> {
    file: ConfigFile<CouchbaseCluster>,
    version: Option<Version>,
    cluster_spec: &'a ClusterSpec,
    test_config: &'a TestConfig,
}

impl<'a> CouchbaseClusterFile<'a> {
    pub fn new(
        paths: &OperatorPaths,
        version: Option<Version>,
        cluster_spec: &'a ClusterSpec,
        test_config: &'a TestConfig,
    ) -> Self {
        Self {
            file: paths.open(templates::CLUSTER),
            version,
            cluster_spec,
            test_config,
        }
    }

    pub fn cluster(&self) -> &CouchbaseCluster {
        self.file.document()
    }

    pub fn cluster_name(&self) -> String {
        self.cluster().name_any()
    }

    fn cluster_mut(&mut self) -> &mut CouchbaseCluster {
        self.file.document_mut()
    }

    fn cluster_config_mut(&mut self) -> Result<&mut ClusterConfigSpec> {
        self.cluster_mut()
            .spec
            .cluster
            .as_mut()
            .ok_or_else(|| Error::MissingField("spec.cluster".to_string()))
    }

    /// Server image and the size of the first server group.
    pub fn set_server_spec(&mut self, image: &str, count: u32) -> Result<()> {
        let spec = &mut self.cluster_mut().spec;
        spec.image = image.to_string();
        spec.servers
            .first_mut()
            .ok_or_else(|| Error::MissingField("spec.servers[0]".to_string()))?
            .size = Some(count);
        Ok(())
    }

    /// Backup image, or no backup section at all.
    pub fn set_backup(&mut self, image: Option<&str>) -> Result<()> {
        let spec = &mut self.cluster_mut().spec;
        match image {
            Some(image) => {
                spec.backup
                    .as_mut()
                    .ok_or_else(|| Error::MissingField("spec.backup".to_string()))?
                    .image = Some(image.to_string());
            }
            None => spec.backup = None,
        }
        Ok(())
    }

    /// Prometheus exporter sidecar, or no monitoring section at all.
    pub fn set_exporter(&mut self, image: Option<&str>, refresh_rate: u32) -> Result<()> {
        let spec = &mut self.cluster_mut().spec;
        match image {
            Some(image) => {
                let prometheus = spec
                    .monitoring
                    .as_mut()
                    .and_then(|m| m.prometheus.as_mut())
                    .ok_or_else(|| Error::MissingField("spec.monitoring.prometheus".to_string()))?;
                prometheus.image = Some(image.to_string());
                prometheus.refresh_rate = Some(refresh_rate);
            }
            None => spec.monitoring = None,
        }
        Ok(())
    }

    pub fn set_memory_quota(&mut self) -> Result<()> {
        let quotas = &self.test_config.cluster;
        let optional = |quota: u64| (quota > 0).then(|| mebibytes(quota));
        let (search, analytics, eventing) = (
            optional(quotas.fts_index_mem_quota),
            optional(quotas.analytics_mem_quota),
            optional(quotas.eventing_mem_quota),
        );
        let (data, index) = (mebibytes(quotas.mem_quota), mebibytes(quotas.index_mem_quota));

        let cluster = self.cluster_config_mut()?;
        cluster.data_service_memory_quota = Some(data);
        cluster.index_service_memory_quota = Some(index);
        if search.is_some() {
            cluster.search_service_memory_quota = search;
        }
        if analytics.is_some() {
            cluster.analytics_service_memory_quota = analytics;
        }
        if eventing.is_some() {
            cluster.eventing_service_memory_quota = eventing;
        }
        Ok(())
    }

    /// Index storage mode, only when the cluster has index nodes.
    pub fn set_index_settings(&mut self) -> Result<()> {
        if self.cluster_spec.servers_by_role("index").is_empty() {
            return Ok(());
        }
        let Some(mode) = self.test_config.gsi_settings.storage_mode() else {
            return Ok(());
        };
        let mode = mode.to_string();
        self.cluster_config_mut()?.index_storage_setting = Some(mode);
        Ok(())
    }

    /// One server group and volume claim template per distinct role set.
    pub fn set_services(&mut self) -> Result<()> {
        let mut role_sets: Vec<(Vec<String>, u32)> = Vec::new();
        for server in self.cluster_spec.roles() {
            let services: Vec<String> = server
                .roles
                .iter()
                .map(|r| to_operator_service(r).to_string())
                .collect();
            match role_sets.iter_mut().find(|(s, _)| *s == services) {
                Some((_, count)) => *count += 1,
                None => role_sets.push((services, 1)),
            }
        }

        let istio = self.cluster_spec.istio_enabled(defaults::ISTIO_CLUSTER).to_string();

        let mut servers = Vec::with_capacity(role_sets.len());
        let mut claims = Vec::with_capacity(role_sets.len());
        for (services, count) in role_sets {
            let name = services.join("-");
            let definition = self.test_config.server_group_definition(&name);
            let volume_size = definition
                .volume_size
                .as_deref()
                .unwrap_or(defaults::VOLUME_SIZE);

            let mut node_selector: BTreeMap<String, String> = services
                .iter()
                .map(|s| (format!("{}_enabled", to_harness_service(s)), "true".to_string()))
                .collect();
            node_selector.insert("NodeRoles".to_string(), defaults::NODE_ROLES_SELECTOR.to_string());

            debug!("Server group {} with {} node(s)", name, definition.nodes.unwrap_or(count));
            servers.push(ServerGroup {
                name: name.clone(),
                size: Some(definition.nodes.unwrap_or(count)),
                services,
                pod: Some(PodTemplate {
                    metadata: ObjectMeta {
                        annotations: Some(BTreeMap::from([(
                            annotations::ISTIO_INJECT.to_string(),
                            istio.clone(),
                        )])),
                        ..Default::default()
                    },
                    spec: PodSettings {
                        image_pull_secrets: vec![SecretReference {
                            name: defaults::PULL_SECRET.to_string(),
                        }],
                        node_selector,
                        ..Default::default()
                    },
                }),
                volume_mounts: Some(VolumeMounts {
                    default: name.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            });
            claims.push(VolumeClaimTemplate {
                metadata: ObjectMeta {
                    name: Some(name),
                    ..Default::default()
                },
                spec: VolumeClaimSpec {
                    resources: StorageResources {
                        requests: BTreeMap::from([(
                            "storage".to_string(),
                            volume_size_to_quantity(volume_size),
                        )]),
                    },
                    ..Default::default()
                },
            });
        }

        let spec = &mut self.cluster_mut().spec;
        spec.servers = servers;
        spec.volume_claim_templates = claims;
        Ok(())
    }

    pub fn configure_auto_compaction(&mut self) -> Result<()> {
        let compaction = &self.test_config.compaction;
        let auto_compaction = AutoCompaction {
            database_fragmentation_threshold: Some(threshold(compaction.db_percentage)),
            view_fragmentation_threshold: Some(threshold(compaction.view_percentage)),
            parallel_compaction: Some(compaction.parallel),
            ..Default::default()
        };
        self.cluster_config_mut()?.auto_compaction = Some(auto_compaction);
        Ok(())
    }

    pub fn set_auto_failover(&mut self) -> Result<()> {
        let bucket = &self.test_config.bucket;
        let enabled = bucket.autofailover_enabled;
        let disk_period = format!("{}s", bucket.disk_failover_timeout);
        let timeout = format!("{}s", bucket.failover_timeout());

        let cluster = self.cluster_config_mut()?;
        cluster.auto_failover_max_count = Some(1);
        cluster.auto_failover_server_group = Some(enabled);
        cluster.auto_failover_on_data_disk_issues = Some(enabled);
        cluster.auto_failover_on_data_disk_issues_time_period = Some(disk_period);
        cluster.auto_failover_timeout = Some(timeout);
        Ok(())
    }

    /// CPU limit of two vCPUs per online core on every server group.
    pub fn set_cpu_settings(&mut self) {
        let cores = self.test_config.cluster.online_cores;
        if cores == 0 {
            debug!("No online_cores configured, leaving CPU limits unset");
            return;
        }
        let vcpus = Quantity(cores.saturating_mul(2).to_string());
        for group in &mut self.cluster_mut().spec.servers {
            group.set_limit("cpu", vcpus.clone());
        }
    }

    /// Kernel memory limit on the server groups running a tuned service.
    pub fn set_memory_settings(&mut self) {
        let test_config = self.test_config;
        let settings = &test_config.cluster;
        if settings.kernel_mem_limit == 0 {
            return;
        }
        let tuned: BTreeSet<&str> = settings
            .kernel_mem_limit_services
            .iter()
            .map(|s| to_operator_service(s))
            .collect();
        let memory = Quantity(mebibytes(settings.kernel_mem_limit));

        for group in &mut self.cluster_mut().spec.servers {
            if group.services.iter().any(|s| tuned.contains(s.as_str())) {
                group.set_limit("memory", memory.clone());
            }
        }
    }

    /// Mark the server group named `server_group` for autoscaling.
    pub fn configure_autoscaling(&mut self, server_group: &str) {
        let servers = &mut self.cluster_mut().spec.servers;
        match servers.iter_mut().find(|g| g.name == server_group) {
            Some(group) => group.autoscale_enabled = Some(true),
            None => warn!("No server group named {} to autoscale", server_group),
        }
    }

    /// Cloud Native Gateway sidecar image. Requires operator 2.6.0 or later.
    pub fn set_cng_version(&mut self, image: &str) -> Result<()> {
        let gate = VersionGate::new("CNG").since(Version::new(2, 6, 0));
        supported_for(self, &gate, |file| {
            file.cluster_mut()
                .spec
                .networking
                .as_mut()
                .ok_or_else(|| Error::MissingField("spec.networking".to_string()))?
                .cloud_native_gateway = Some(CloudNativeGateway {
                image: image.to_string(),
                ..Default::default()
            });
            Ok(())
        })
        .unwrap_or(Ok(()))
    }
}

fn mebibytes(value: u64) -> String {
    format!("{value}Mi")
}

fn threshold(percent: u32) -> FragmentationThreshold {
    FragmentationThreshold {
        percent: Some(percent),
        ..Default::default()
    }
}

impl Versioned for CouchbaseClusterFile<'_> {
    fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }
}

impl ManagedFile for CouchbaseClusterFile<'_> {
    type Document = CouchbaseCluster;

    fn config_file(&self) -> &ConfigFile<CouchbaseCluster> {
        &self.file
    }

    fn config_file_mut(&mut self) -> &mut ConfigFile<CouchbaseCluster> {
        &mut self.file
    }
}
