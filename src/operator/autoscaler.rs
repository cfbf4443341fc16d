// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::templates;
use crate::error::{Error, Result};
use crate::files::{ConfigFile, ManagedFile};
use crate::operator::OperatorPaths;
use k8s_openapi::api::autoscaling::v2::{
    HorizontalPodAutoscaler, MetricIdentifier, MetricSpec, MetricTarget, PodsMetricSource,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricTargetType {
    Value,
    AverageValue,
    Utilization,
}

impl FromStr for MetricTargetType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "value" => Ok(MetricTargetType::Value),
            "averagevalue" => Ok(MetricTargetType::AverageValue),
            "utilization" => Ok(MetricTargetType::Utilization),
            _ => Err(format!(
                "Invalid metric target type: {s}. Must be one of: Value, AverageValue, Utilization"
            )),
        }
    }
}

impl fmt::Display for MetricTargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricTargetType::Value => write!(f, "Value"),
            MetricTargetType::AverageValue => write!(f, "AverageValue"),
            MetricTargetType::Utilization => write!(f, "Utilization"),
        }
    }
}

/// What the autoscaler scales and on which metric.
#[derive(Debug, Clone)]
pub struct AutoscalerTarget {
    pub cluster_name: String,
    pub server_group: String,
    pub min_replicas: i32,
    pub max_replicas: i32,
    pub metric: String,
    pub target_type: MetricTargetType,
    /// A quantity, or a percentage for `Utilization`
    pub target_value: String,
}

impl AutoscalerTarget {
    fn metric_target(&self) -> Result<MetricTarget> {
        let mut target = MetricTarget {
            type_: self.target_type.to_string(),
            ..Default::default()
        };
        match self.target_type {
            MetricTargetType::Value => target.value = Some(Quantity(self.target_value.clone())),
            MetricTargetType::AverageValue => {
                target.average_value = Some(Quantity(self.target_value.clone()))
            }
            MetricTargetType::Utilization => {
                let percent = self.target_value.trim().parse().map_err(|_| {
                    Error::InvalidDocument(format!(
                        "utilization target must be a whole percentage, got {}",
                        self.target_value
                    ))
                })?;
                target.average_utilization = Some(percent);
            }
        }
        Ok(target)
    }
}

/// Horizontal pod autoscaler for a server group of the cluster.
pub struct HorizontalAutoscalerFile {
    file: ConfigFile<HorizontalPodAutoscaler>,
}

impl HorizontalAutoscalerFile {
    pub fn new(paths: &OperatorPaths) -> Self {
        Self {
            file: paths.open(templates::AUTOSCALER),
        }
    }

    pub fn autoscaler(&self) -> &HorizontalPodAutoscaler {
        self.file.document()
    }

    pub fn setup_pod_autoscaler(&mut self, target: &AutoscalerTarget) -> Result<()> {
        let metric = MetricSpec {
            type_: "Pods".to_string(),
            pods: Some(PodsMetricSource {
                metric: MetricIdentifier {
                    name: target.metric.clone(),
                    ..Default::default()
                },
                target: target.metric_target()?,
            }),
            ..Default::default()
        };

        let spec = self
            .file
            .document_mut()
            .spec
            .as_mut()
            .ok_or_else(|| Error::MissingField("spec".to_string()))?;
        spec.scale_target_ref.name = format!("{}.{}", target.server_group, target.cluster_name);
        spec.min_replicas = Some(target.min_replicas);
        spec.max_replicas = target.max_replicas;
        spec.metrics = Some(vec![metric]);
        Ok(())
    }
}

impl ManagedFile for HorizontalAutoscalerFile {
    type Document = HorizontalPodAutoscaler;

    fn config_file(&self) -> &ConfigFile<HorizontalPodAutoscaler> {
        &self.file
    }

    fn config_file_mut(&mut self) -> &mut ConfigFile<HorizontalPodAutoscaler> {
        &mut self.file
    }
}
