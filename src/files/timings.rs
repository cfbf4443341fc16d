// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Elapsed time of resource management operations (cluster deployment,
//! bucket creation, ...) recorded in `timings.json` over a test run.

use crate::error::Result;
use crate::files::{ConfigFile, FileType, ManagedFile};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// Operation name to elapsed seconds
pub type Timings = BTreeMap<String, f64>;

pub struct TimeTrackingFile {
    file: ConfigFile<Timings>,
}

impl TimeTrackingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: ConfigFile::open(path, Some(FileType::Json)),
        }
    }

    /// Merge one measurement into the file, keeping earlier entries.
    pub fn record(&mut self, operation: &str, elapsed: Duration) -> Result<()> {
        self.scoped(|tracker| {
            tracker
                .file
                .document_mut()
                .insert(operation.to_string(), elapsed.as_secs_f64());
            Ok(())
        })?;
        info!("Recorded {}: {:.3}s", operation, elapsed.as_secs_f64());
        Ok(())
    }

    /// Run `f` and record how long it took.
    pub fn time<R>(&mut self, operation: &str, f: impl FnOnce() -> R) -> Result<R> {
        let start = Instant::now();
        let result = f();
        self.record(operation, start.elapsed())?;
        Ok(result)
    }

    pub fn timings(&self) -> &Timings {
        self.file.document()
    }
}

impl ManagedFile for TimeTrackingFile {
    type Document = Timings;

    fn config_file(&self) -> &ConfigFile<Timings> {
        &self.file
    }

    fn config_file_mut(&mut self) -> &mut ConfigFile<Timings> {
        &mut self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timings.json");

        TimeTrackingFile::new(&path)
            .record("cluster_deployment", Duration::from_millis(1500))
            .unwrap();
        let mut tracker = TimeTrackingFile::new(&path);
        tracker
            .record("bucket_creation", Duration::from_millis(250))
            .unwrap();

        let timings = tracker.timings();
        assert_eq!(timings.len(), 2);
        assert_eq!(timings["cluster_deployment"], 1.5);
        assert_eq!(timings["bucket_creation"], 0.25);
    }

    #[test]
    fn test_time_returns_closure_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = TimeTrackingFile::new(dir.path().join("timings.json"));

        let value = tracker.time("noop", || 42).unwrap();

        assert_eq!(value, 42);
        assert!(tracker.timings().contains_key("noop"));
    }
}
