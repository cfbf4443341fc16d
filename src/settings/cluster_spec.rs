// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::Result;
use crate::files::IniDocument;
use crate::settings::{parse_opt, read_sections, split_list, Section};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// A server line of a `[clusters]` entry: `host:role,role`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEntry {
    pub host: String,
    pub roles: Vec<String>,
}

impl ServerEntry {
    fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((host, roles)) => Self {
                host: host.to_string(),
                roles: roles
                    .split(',')
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
            None => Self {
                host: raw.to_string(),
                roles: vec!["kv".to_string()],
            },
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Layout of the system under test.
#[derive(Debug, Clone, Default)]
pub struct ClusterSpec {
    clusters: Vec<(String, Vec<ServerEntry>)>,
    workers: Vec<String>,
    sections: IniDocument,
}

impl ClusterSpec {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let spec = Self::from_sections(read_sections(path)?);
        debug!(
            "Loaded cluster spec {} with {} cluster(s)",
            path.display(),
            spec.clusters.len()
        );
        Ok(spec)
    }

    pub fn from_sections(sections: IniDocument) -> Self {
        let clusters = sections
            .get("clusters")
            .map(|section| {
                section
                    .iter()
                    .map(|(name, servers)| {
                        let entries = servers.split_whitespace().map(ServerEntry::parse).collect();
                        (name.clone(), entries)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let workers = sections
            .get("clients")
            .and_then(|s| s.get("hosts"))
            .map(|hosts| split_list(hosts.as_str()))
            .unwrap_or_default();

        Self {
            clusters,
            workers,
            sections,
        }
    }

    pub fn cluster_names(&self) -> impl Iterator<Item = &str> {
        self.clusters.iter().map(|(name, _)| name.as_str())
    }

    /// Servers of every cluster with their roles, in file order.
    pub fn roles(&self) -> impl Iterator<Item = &ServerEntry> {
        self.clusters.iter().flat_map(|(_, servers)| servers.iter())
    }

    pub fn servers_by_role(&self, role: &str) -> Vec<&str> {
        self.roles()
            .filter(|s| s.has_role(role))
            .map(|s| s.host.as_str())
            .collect()
    }

    pub fn workers(&self) -> &[String] {
        &self.workers
    }

    /// A raw section such as `[k8s]`.
    pub fn infrastructure_section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn infrastructure_value<T: FromStr>(&self, section: &str, key: &str) -> Result<Option<T>> {
        parse_opt(self.sections.get(section), section, key)
    }

    /// `istio_enabled` under `[k8s]` is either a boolean or a list of cluster names.
    pub fn istio_enabled(&self, cluster: &str) -> bool {
        match self
            .sections
            .get("k8s")
            .and_then(|s| s.get("istio_enabled"))
        {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" | "" => false,
                _ => split_list(raw).iter().any(|name| name == cluster),
            },
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_section;

    fn make_spec() -> ClusterSpec {
        ClusterSpec::from_sections(IniDocument::from([
            make_section(
                "clusters",
                &[(
                    "k8s_cluster_1",
                    "10.0.0.1:kv 10.0.0.2:kv 10.0.0.3:index,n1ql 10.0.0.4",
                )],
            ),
            make_section("clients", &[("hosts", "worker-0 worker-1")]),
            make_section(
                "k8s",
                &[("istio_enabled", "k8s_cluster_1,k8s_cluster_3"), ("worker_cpu_limit", "40")],
            ),
        ]))
    }

    #[test]
    fn test_roles_in_file_order() {
        let spec = make_spec();

        let hosts: Vec<_> = spec.roles().map(|s| s.host.as_str()).collect();
        assert_eq!(hosts, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"]);
        assert_eq!(spec.roles().nth(2).unwrap().roles, vec!["index", "n1ql"]);
    }

    #[test]
    fn test_server_without_roles_is_kv() {
        let spec = make_spec();

        assert_eq!(spec.servers_by_role("kv"), vec!["10.0.0.1", "10.0.0.2", "10.0.0.4"]);
        assert_eq!(spec.servers_by_role("index"), vec!["10.0.0.3"]);
        assert!(spec.servers_by_role("fts").is_empty());
    }

    #[test]
    fn test_workers() {
        assert_eq!(make_spec().workers(), &["worker-0", "worker-1"]);
    }

    #[test]
    fn test_infrastructure_value() {
        let spec = make_spec();

        assert_eq!(spec.infrastructure_value::<u32>("k8s", "worker_cpu_limit").unwrap(), Some(40));
        assert_eq!(spec.infrastructure_value::<u32>("k8s", "worker_mem_limit").unwrap(), None);
        assert!(spec.infrastructure_value::<u32>("k8s", "istio_enabled").is_err());
    }

    #[test]
    fn test_istio_enabled_by_cluster_list() {
        let spec = make_spec();

        assert!(spec.istio_enabled("k8s_cluster_1"));
        assert!(!spec.istio_enabled("k8s_cluster_2"));
    }

    #[test]
    fn test_istio_enabled_flag() {
        let spec = ClusterSpec::from_sections(IniDocument::from([make_section(
            "k8s",
            &[("istio_enabled", "true")],
        )]));

        assert!(spec.istio_enabled("anything"));
        assert!(!ClusterSpec::default().istio_enabled("k8s_cluster_1"));
    }

    #[test]
    fn test_clusters_keep_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("multi.spec");
        std::fs::write(
            &path,
            "[clusters]\nzeta = z0:kv\nalpha = a0:index\n\n[clients]\nhosts = w0\n",
        )
        .unwrap();

        let spec = ClusterSpec::load(&path).unwrap();

        assert_eq!(spec.cluster_names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        let hosts: Vec<_> = spec.roles().map(|s| s.host.as_str()).collect();
        assert_eq!(hosts, vec!["z0", "a0"]);
    }
}
