// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::templates;
use crate::error::Result;
use crate::files::{ConfigFile, ManagedFile};
use crate::operator::{first_container, set_replicas, OperatorPaths};
use crate::types::Manifest;
use k8s_openapi::api::apps::v1::Deployment;
use tracing::debug;

/// Sync Gateway bootstrap secret, deployment and service.
pub struct SyncGatewayFile {
    file: ConfigFile<Manifest>,
    image: String,
    node_count: i32,
}

impl SyncGatewayFile {
    pub fn new(paths: &OperatorPaths, image: &str, node_count: i32) -> Self {
        Self {
            file: paths.open(templates::SYNC_GATEWAY),
            image: image.to_string(),
            node_count,
        }
    }

    pub fn manifests(&self) -> &[Manifest] {
        self.file.documents()
    }

    /// Image and replicas of the deployment; the other documents are left alone.
    pub fn configure_sgw(&mut self) -> Result<()> {
        let (image, replicas) = (&self.image, self.node_count);
        for manifest in self.file.documents_mut() {
            if !manifest.is_kind::<Deployment>() {
                continue;
            }
            debug!("Configuring deployment {}", manifest.name());
            manifest.update::<Deployment>(|deployment| {
                set_replicas(deployment, replicas)?;
                first_container(deployment)?.image = Some(image.clone());
                Ok(())
            })?;
        }
        Ok(())
    }
}

impl ManagedFile for SyncGatewayFile {
    type Document = Manifest;

    fn config_file(&self) -> &ConfigFile<Manifest> {
        &self.file
    }

    fn config_file_mut(&mut self) -> &mut ConfigFile<Manifest> {
        &mut self.file
    }
}
