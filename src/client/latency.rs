// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Data operations whose latency is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Create,
    Read,
    Get,
    Update,
    Delete,
    Query,
    ViewQuery,
    UpsertUser,
    Management,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Get => "get",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Query => "query",
            Operation::ViewQuery => "view_query",
            Operation::UpsertUser => "upsert_user",
            Operation::Management => "management",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub count: usize,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
}

/// Latency samples per operation
#[derive(Debug, Default)]
pub struct LatencyRecorder {
    samples: Mutex<BTreeMap<Operation, Vec<Duration>>>,
}

impl LatencyRecorder {
    fn samples_mut(&self) -> MutexGuard<'_, BTreeMap<Operation, Vec<Duration>>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, operation: Operation, elapsed: Duration) {
        self.samples_mut().entry(operation).or_default().push(elapsed);
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.samples_mut().get(&operation).map_or(0, Vec::len)
    }

    pub fn samples(&self, operation: Operation) -> Vec<Duration> {
        self.samples_mut().get(&operation).cloned().unwrap_or_default()
    }

    /// Nearest-rank percentiles over the recorded samples.
    pub fn summary(&self, operation: Operation) -> Option<LatencySummary> {
        let mut samples = self.samples(operation);
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable();

        let count = samples.len();
        let total: Duration = samples.iter().sum();
        let rank = |p: usize| samples[(count * p).div_ceil(100).saturating_sub(1)];
        Some(LatencySummary {
            count,
            min: samples[0],
            max: samples[count - 1],
            mean: total / u32::try_from(count).unwrap_or(u32::MAX),
            p50: rank(50),
            p95: rank(95),
            p99: rank(99),
        })
    }

    pub fn clear(&self) {
        self.samples_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_summary_nearest_rank() {
        let recorder = LatencyRecorder::default();
        for ms in (1..=100).rev() {
            recorder.record(Operation::Read, millis(ms));
        }

        let summary = recorder.summary(Operation::Read).unwrap();

        assert_eq!(summary.count, 100);
        assert_eq!(summary.min, millis(1));
        assert_eq!(summary.max, millis(100));
        assert_eq!(summary.p50, millis(50));
        assert_eq!(summary.p95, millis(95));
        assert_eq!(summary.p99, millis(99));
        assert_eq!(summary.mean, Duration::from_micros(50_500));
    }

    #[test]
    fn test_single_sample() {
        let recorder = LatencyRecorder::default();
        recorder.record(Operation::Query, millis(7));

        let summary = recorder.summary(Operation::Query).unwrap();

        assert_eq!(summary.p50, millis(7));
        assert_eq!(summary.p99, millis(7));
    }

    #[test]
    fn test_operations_are_separate() {
        let recorder = LatencyRecorder::default();
        recorder.record(Operation::Update, millis(3));

        assert_eq!(recorder.count(Operation::Update), 1);
        assert_eq!(recorder.count(Operation::Delete), 0);
        assert!(recorder.summary(Operation::Delete).is_none());

        recorder.clear();
        assert_eq!(recorder.count(Operation::Update), 0);
    }
}
