// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys written into generated manifests
pub mod annotations {
    /// Operator version the manifests were rendered for
    pub const CONFIG_VERSION: &str = "config.couchbase.com/version";
    /// Toggles the istio sidecar on server pods
    pub const ISTIO_INJECT: &str = "sidecar.istio.io/inject";
}

/// Environment variables read by `Config::from_env`
pub mod env_vars {
    pub const TEMPLATE_DIR: &str = "CBPERF_TEMPLATE_DIR";
    pub const OUTPUT_DIR: &str = "CBPERF_OUTPUT_DIR";
    pub const TIMINGS_FILE: &str = "CBPERF_TIMINGS_FILE";
}

/// Default on-disk layout
pub mod paths {
    pub const TEMPLATE_DIR: &str = "cloud/operator/templates";
    pub const OUTPUT_DIR: &str = "cloud/operator";
    pub const TIMINGS_FILE: &str = "timings.json";
    /// Suffix stripped from a template name to get its destination name
    pub const TEMPLATE_SUFFIX: &str = "_template";
}

/// Template names under the template directory
pub mod templates {
    pub const CONFIG: &str = "config_template";
    pub const CLUSTER: &str = "couchbase-cluster_template";
    pub const BUCKET: &str = "bucket_template";
    pub const BACKUP: &str = "backup_template";
    pub const AUTOSCALER: &str = "autoscaler_template";
    pub const WORKER: &str = "worker_template";
    pub const SYNC_GATEWAY: &str = "syncgateway_template";
}

/// Defaults applied by the template setters
pub mod defaults {
    pub const VOLUME_SIZE: &str = "1000GB";
    pub const PULL_SECRET: &str = "regcred";
    pub const NODE_ROLES_SELECTOR: &str = "couchbase1";
    pub const ISTIO_CLUSTER: &str = "k8s_cluster_1";
    pub const OPERATOR_DEPLOYMENT: &str = "couchbase-operator";
    pub const WORKER_CPU_LIMIT: u32 = 80;
    pub const WORKER_MEM_LIMIT_GI: u32 = 128;
    pub const BUCKET_REPLICAS: u32 = 1;
    pub const EVICTION_POLICY: &str = "valueOnly";
    pub const COMPRESSION_MODE: &str = "off";
    pub const CONFLICT_RESOLUTION: &str = "seqno";
}

/// Client connection and retry tuning
pub mod client {
    /// Key-value timeout in seconds
    pub const KV_TIMEOUT_SECS: u64 = 600;
    /// N1QL timeout in seconds
    pub const QUERY_TIMEOUT_SECS: u64 = 600;
    /// Root certificate path appended to secure connection strings
    pub const CERT_PATH: &str = "root.pem";
    /// Initial retry delay in milliseconds
    pub const RETRY_INITIAL_DELAY_MS: u64 = 100;
    /// Maximum retry delay in milliseconds (exponential backoff cap)
    pub const RETRY_MAX_DELAY_MS: u64 = 10_000;
    pub const RETRY_MAX_ATTEMPTS: u32 = 10;
    pub const DEFAULT_SCOPE: &str = "_default";
    pub const DEFAULT_COLLECTION: &str = "_default";
}
