// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{defaults, templates};
use crate::error::Result;
use crate::files::{ConfigFile, ManagedFile};
use crate::operator::OperatorPaths;
use crate::settings::BucketSettings;
use crate::types::CouchbaseBucket;
use tracing::debug;

/// A `CouchbaseBucket` manifest, written to `<output_dir>/<bucket>.yaml`.
pub struct CouchbaseBucketFile {
    file: ConfigFile<CouchbaseBucket>,
    bucket_name: String,
}

impl CouchbaseBucketFile {
    pub fn new(paths: &OperatorPaths, bucket_name: &str) -> Self {
        Self {
            file: paths
                .open(templates::BUCKET)
                .with_destination(paths.output(&format!("{bucket_name}.yaml"))),
            bucket_name: bucket_name.to_string(),
        }
    }

    pub fn bucket(&self) -> &CouchbaseBucket {
        self.file.document()
    }

    /// `quota` is in MiB; unset settings fall back to the operator defaults.
    pub fn set_bucket_settings(&mut self, quota: u64, settings: &BucketSettings) -> Result<()> {
        let bucket = self.file.document_mut();
        bucket.metadata.name = Some(self.bucket_name.clone());

        let spec = &mut bucket.spec;
        spec.memory_quota = Some(format!("{quota}Mi"));
        spec.replicas = Some(settings.replica_number.unwrap_or(defaults::BUCKET_REPLICAS));
        spec.eviction_policy = Some(
            settings
                .eviction_policy
                .clone()
                .unwrap_or_else(|| defaults::EVICTION_POLICY.to_string()),
        );
        spec.compression_mode = Some(
            settings
                .compression_mode
                .clone()
                .unwrap_or_else(|| defaults::COMPRESSION_MODE.to_string()),
        );
        spec.conflict_resolution = Some(
            settings
                .conflict_resolution_type
                .clone()
                .unwrap_or_else(|| defaults::CONFLICT_RESOLUTION.to_string()),
        );
        debug!("Bucket {} with {}Mi", self.bucket_name, quota);
        Ok(())
    }
}

impl ManagedFile for CouchbaseBucketFile {
    type Document = CouchbaseBucket;

    fn config_file(&self) -> &ConfigFile<CouchbaseBucket> {
        &self.file
    }

    fn config_file_mut(&mut self) -> &mut ConfigFile<CouchbaseBucket> {
        &mut self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_paths;

    #[test]
    fn test_defaults_without_overrides() {
        let (dir, paths) = make_paths();
        let mut file = CouchbaseBucketFile::new(&paths, "bucket-2");
        let settings = BucketSettings {
            replica_number: Some(1),
            ..Default::default()
        };

        file.scoped(|f| f.set_bucket_settings(256, &settings)).unwrap();

        assert_eq!(file.config_file().destination(), dir.path().join("bucket-2.yaml"));
        let spec = &file.bucket().spec;
        assert_eq!(spec.memory_quota.as_deref(), Some("256Mi"));
        assert_eq!(spec.replicas, Some(1));
        assert_eq!(spec.eviction_policy.as_deref(), Some("valueOnly"));
        assert_eq!(spec.compression_mode.as_deref(), Some("off"));
        assert_eq!(spec.conflict_resolution.as_deref(), Some("seqno"));
        assert_eq!(file.bucket().metadata.name.as_deref(), Some("bucket-2"));
    }

    #[test]
    fn test_overrides_and_template_fields() {
        let (_dir, paths) = make_paths();
        let mut file = CouchbaseBucketFile::new(&paths, "bucket-1");
        let settings = BucketSettings {
            replica_number: Some(2),
            eviction_policy: Some("fullEviction".to_string()),
            compression_mode: Some("active".to_string()),
            conflict_resolution_type: Some("lww".to_string()),
            ..Default::default()
        };

        file.scoped(|f| f.set_bucket_settings(1024, &settings)).unwrap();

        let written = std::fs::read_to_string(file.config_file().destination()).unwrap();
        assert!(written.contains("ioPriority: high"));
        assert!(written.contains("compressionMode: active"));
        assert!(written.contains("conflictResolution: lww"));
        assert!(written.contains("evictionPolicy: fullEviction"));
        assert!(written.contains("replicas: 2"));
    }
}
