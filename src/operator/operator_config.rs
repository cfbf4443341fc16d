// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{annotations, defaults, templates};
use crate::error::Result;
use crate::files::{ConfigFile, ManagedFile};
use crate::operator::{first_container, OperatorPaths};
use crate::types::Manifest;
use k8s_openapi::api::apps::v1::Deployment;

/// Operator and admission controller deployments with their RBAC objects.
pub struct OperatorConfigFile {
    file: ConfigFile<Manifest>,
    version: String,
    operator_image: String,
    controller_image: String,
}

impl OperatorConfigFile {
    pub fn new(
        paths: &OperatorPaths,
        version: &str,
        operator_image: &str,
        controller_image: &str,
    ) -> Self {
        Self {
            file: paths.open(templates::CONFIG),
            version: version.to_string(),
            operator_image: operator_image.to_string(),
            controller_image: controller_image.to_string(),
        }
    }

    pub fn manifests(&self) -> &[Manifest] {
        self.file.documents()
    }

    pub fn setup_config(&mut self) -> Result<()> {
        self.inject_images()?;
        self.inject_version_annotations();
        Ok(())
    }

    fn inject_images(&mut self) -> Result<()> {
        for manifest in self.file.documents_mut() {
            if !manifest.is_kind::<Deployment>() {
                continue;
            }
            let image = if manifest.name() == defaults::OPERATOR_DEPLOYMENT {
                &self.operator_image
            } else {
                &self.controller_image
            };
            manifest.update::<Deployment>(|deployment| {
                first_container(deployment)?.image = Some(image.clone());
                Ok(())
            })?;
        }
        Ok(())
    }

    fn inject_version_annotations(&mut self) {
        for manifest in self.file.documents_mut() {
            manifest
                .annotations_mut()
                .insert(annotations::CONFIG_VERSION.to_string(), self.version.clone());
        }
    }
}

impl ManagedFile for OperatorConfigFile {
    type Document = Manifest;

    fn config_file(&self) -> &ConfigFile<Manifest> {
        &self.file
    }

    fn config_file_mut(&mut self) -> &mut ConfigFile<Manifest> {
        &mut self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_paths;

    #[test]
    fn test_setup_config() {
        let (dir, paths) = make_paths();
        let mut file = OperatorConfigFile::new(
            &paths,
            "2.6.1",
            "couchbase/operator:2.6.1",
            "couchbase/admission-controller:2.6.1",
        );

        file.scoped(|f| f.setup_config()).unwrap();

        assert_eq!(file.config_file().destination(), dir.path().join("config.yaml"));
        let manifests = file.manifests();
        assert_eq!(manifests.len(), 5);
        for manifest in manifests {
            let annotations = manifest.metadata.annotations.as_ref().unwrap();
            assert_eq!(annotations[annotations::CONFIG_VERSION], "2.6.1");
        }

        let images: Vec<_> = manifests
            .iter()
            .filter(|m| m.is_kind::<Deployment>())
            .map(|m| {
                let mut deployment = m.to_resource::<Deployment>().unwrap();
                first_container(&mut deployment).unwrap().image.clone().unwrap()
            })
            .collect();
        assert_eq!(
            images,
            vec!["couchbase/operator:2.6.1", "couchbase/admission-controller:2.6.1"]
        );
    }
}
