// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Shared fixtures for unit tests.

use crate::files::IniDocument;
use crate::operator::OperatorPaths;
use crate::settings::{ClusterSpec, TestConfig};
use indexmap::IndexMap;
use std::path::PathBuf;
use tempfile::TempDir;

/// The templates bundled with the crate.
pub fn templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(crate::constants::paths::TEMPLATE_DIR)
}

/// Bundled templates in, a fresh temporary directory out.
///
/// Keep the returned `TempDir` alive for as long as the paths are used.
pub fn make_paths() -> (TempDir, OperatorPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = OperatorPaths::new(templates_dir(), dir.path());
    (dir, paths)
}

pub fn make_section(name: &str, pairs: &[(&str, &str)]) -> (String, IndexMap<String, String>) {
    (
        name.to_string(),
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

/// Two data nodes, one index+query node and one search node, two workers.
pub fn make_cluster_spec() -> ClusterSpec {
    ClusterSpec::from_sections(IniDocument::from([
        make_section(
            "clusters",
            &[(
                "k8s_cluster_1",
                "cb-0:kv cb-1:kv cb-2:index,n1ql cb-3:fts",
            )],
        ),
        make_section("clients", &[("hosts", "worker-0 worker-1")]),
        make_section("k8s", &[("istio_enabled", "k8s_cluster_1")]),
    ]))
}

pub fn make_test_config(sections: Vec<(String, IndexMap<String, String>)>) -> TestConfig {
    TestConfig::from_sections(&sections.into_iter().collect()).unwrap()
}
