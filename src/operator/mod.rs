// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Operator manifests rendered from the bundled templates.
//!
//! Every file type reads `<template_dir>/<template>.yaml` and writes
//! `<output_dir>/<template without "_template">.yaml`, unless noted otherwise.

pub mod autoscaler;
pub mod backup;
pub mod bucket;
pub mod cluster;
pub mod gateway;
pub mod operator_config;
pub mod services;
pub mod worker;

pub use autoscaler::{AutoscalerTarget, HorizontalAutoscalerFile, MetricTargetType};
pub use backup::CouchbaseBackupFile;
pub use bucket::CouchbaseBucketFile;
pub use cluster::CouchbaseClusterFile;
pub use gateway::SyncGatewayFile;
pub use operator_config::OperatorConfigFile;
pub use worker::WorkerFile;

use crate::config::Config;
use crate::constants::paths::TEMPLATE_SUFFIX;
use crate::error::{Error, Result};
use crate::files::{ConfigFile, FileType};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Container;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct OperatorPaths {
    template_dir: PathBuf,
    output_dir: PathBuf,
}

impl OperatorPaths {
    pub fn new(template_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.template_dir, &config.output_dir)
    }

    pub fn template(&self, name: &str) -> PathBuf {
        self.template_dir.join(format!("{name}.yaml"))
    }

    pub fn destination(&self, name: &str) -> PathBuf {
        let stem = name.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(name);
        self.output(&format!("{stem}.yaml"))
    }

    pub fn output(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Open a template as YAML with its default destination.
    pub fn open<D>(&self, name: &str) -> ConfigFile<D>
    where
        D: Serialize + DeserializeOwned + Default,
    {
        ConfigFile::open(self.template(name), Some(FileType::Yaml))
            .with_destination(self.destination(name))
    }
}

pub(crate) fn first_container(deployment: &mut Deployment) -> Result<&mut Container> {
    deployment
        .spec
        .as_mut()
        .and_then(|spec| spec.template.spec.as_mut())
        .and_then(|pod| pod.containers.first_mut())
        .ok_or_else(|| Error::MissingField("spec.template.spec.containers[0]".to_string()))
}

pub(crate) fn set_replicas(deployment: &mut Deployment, replicas: i32) -> Result<()> {
    deployment
        .spec
        .as_mut()
        .ok_or_else(|| Error::MissingField("spec".to_string()))?
        .replicas = Some(replicas);
    Ok(())
}
