// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{defaults, templates};
use crate::error::Result;
use crate::files::{ConfigFile, ManagedFile};
use crate::operator::{first_container, set_replicas, OperatorPaths};
use crate::settings::ClusterSpec;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

/// Load generator deployment, one replica per client host.
pub struct WorkerFile<'a> {
    file: ConfigFile<Deployment>,
    cluster_spec: &'a ClusterSpec,
}

impl<'a> WorkerFile<'a> {
    pub fn new(paths: &OperatorPaths, cluster_spec: &'a ClusterSpec) -> Self {
        Self {
            file: paths.open(templates::WORKER),
            cluster_spec,
        }
    }

    pub fn deployment(&self) -> &Deployment {
        self.file.document()
    }

    /// Replica count and resource limits from `[clients]` and `[k8s]`.
    pub fn update_worker_spec(&mut self) -> Result<()> {
        let spec = self.cluster_spec;
        let replicas = i32::try_from(spec.workers().len()).unwrap_or(i32::MAX);
        let cpu = spec
            .infrastructure_value::<u32>("k8s", "worker_cpu_limit")?
            .unwrap_or(defaults::WORKER_CPU_LIMIT);
        let memory = spec
            .infrastructure_value::<u32>("k8s", "worker_mem_limit")?
            .unwrap_or(defaults::WORKER_MEM_LIMIT_GI);

        let deployment = self.file.document_mut();
        set_replicas(deployment, replicas)?;
        first_container(deployment)?.resources = Some(ResourceRequirements {
            limits: Some(BTreeMap::from([
                ("cpu".to_string(), Quantity(cpu.to_string())),
                ("memory".to_string(), Quantity(format!("{memory}Gi"))),
            ])),
            ..Default::default()
        });
        Ok(())
    }
}

impl ManagedFile for WorkerFile<'_> {
    type Document = Deployment;

    fn config_file(&self) -> &ConfigFile<Deployment> {
        &self.file
    }

    fn config_file_mut(&mut self) -> &mut ConfigFile<Deployment> {
        &mut self.file
    }
}
