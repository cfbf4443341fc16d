// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::Result;
use crate::files::IniDocument;
use crate::settings::{parse_bool, parse_opt, parse_or, read_sections, split_list, Section};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::path::Path;

const SERVER_GROUP_PREFIX: &str = "server_group:";

/// `[cluster]`: quotas in MiB and kernel tuning
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSettings {
    pub mem_quota: u64,
    pub index_mem_quota: u64,
    pub fts_index_mem_quota: u64,
    pub analytics_mem_quota: u64,
    pub eventing_mem_quota: u64,
    pub online_cores: u32,
    pub kernel_mem_limit: u64,
    /// Services in harness naming (`kv`, `n1ql`, ...) the kernel memory limit applies to
    pub kernel_mem_limit_services: Vec<String>,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            mem_quota: 0,
            index_mem_quota: 0,
            fts_index_mem_quota: 0,
            analytics_mem_quota: 0,
            eventing_mem_quota: 0,
            online_cores: 0,
            kernel_mem_limit: 0,
            kernel_mem_limit_services: ["fts", "kv", "index", "n1ql", "cbas", "eventing"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl ClusterSettings {
    fn from_section(section: Option<&Section>) -> Result<Self> {
        const NAME: &str = "cluster";
        let defaults = Self::default();
        Ok(Self {
            mem_quota: parse_or(section, NAME, "mem_quota", 0)?,
            index_mem_quota: parse_or(section, NAME, "index_mem_quota", 0)?,
            fts_index_mem_quota: parse_or(section, NAME, "fts_index_mem_quota", 0)?,
            analytics_mem_quota: parse_or(section, NAME, "analytics_mem_quota", 0)?,
            eventing_mem_quota: parse_or(section, NAME, "eventing_mem_quota", 0)?,
            online_cores: parse_or(section, NAME, "online_cores", 0)?,
            kernel_mem_limit: parse_or(section, NAME, "kernel_mem_limit", 0)?,
            kernel_mem_limit_services: section
                .and_then(|s| s.get("kernel_mem_limit_services"))
                .map(|raw| split_list(raw))
                .unwrap_or(defaults.kernel_mem_limit_services),
        })
    }
}

/// `[bucket]`
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSettings {
    pub replica_number: Option<u32>,
    pub eviction_policy: Option<String>,
    pub compression_mode: Option<String>,
    pub conflict_resolution_type: Option<String>,
    pub autofailover_enabled: bool,
    /// Seconds; the last entry is the effective timeout
    pub failover_timeouts: Vec<u32>,
    pub disk_failover_timeout: u32,
}

impl Default for BucketSettings {
    fn default() -> Self {
        Self {
            replica_number: None,
            eviction_policy: None,
            compression_mode: None,
            conflict_resolution_type: None,
            autofailover_enabled: true,
            failover_timeouts: vec![120],
            disk_failover_timeout: 120,
        }
    }
}

impl BucketSettings {
    fn from_section(section: Option<&Section>) -> Result<Self> {
        const NAME: &str = "bucket";
        let defaults = Self::default();
        let failover_timeouts = match section.and_then(|s| s.get("failover_timeouts")) {
            Some(raw) => split_list(raw)
                .iter()
                .map(|t| {
                    t.parse().map_err(|_| crate::error::Error::Settings {
                        section: NAME.to_string(),
                        key: "failover_timeouts".to_string(),
                        value: raw.clone(),
                    })
                })
                .collect::<Result<Vec<u32>>>()?,
            None => defaults.failover_timeouts,
        };

        Ok(Self {
            replica_number: parse_opt(section, NAME, "replica_number")?,
            eviction_policy: non_empty(section, "eviction_policy"),
            compression_mode: non_empty(section, "compression_mode"),
            conflict_resolution_type: non_empty(section, "conflict_resolution_type"),
            autofailover_enabled: parse_bool(section, NAME, "autofailover_enabled")?
                .unwrap_or(defaults.autofailover_enabled),
            failover_timeouts,
            disk_failover_timeout: parse_or(
                section,
                NAME,
                "disk_failover_timeout",
                defaults.disk_failover_timeout,
            )?,
        })
    }

    pub fn failover_timeout(&self) -> u32 {
        self.failover_timeouts.last().copied().unwrap_or_default()
    }
}

/// `[compaction]`
#[derive(Debug, Clone, PartialEq)]
pub struct CompactionSettings {
    pub db_percentage: u32,
    pub view_percentage: u32,
    pub parallel: bool,
}

impl Default for CompactionSettings {
    fn default() -> Self {
        Self {
            db_percentage: 30,
            view_percentage: 30,
            parallel: true,
        }
    }
}

impl CompactionSettings {
    fn from_section(section: Option<&Section>) -> Result<Self> {
        const NAME: &str = "compaction";
        let defaults = Self::default();
        Ok(Self {
            db_percentage: parse_or(section, NAME, "db_percentage", defaults.db_percentage)?,
            view_percentage: parse_or(section, NAME, "view_percentage", defaults.view_percentage)?,
            parallel: parse_bool(section, NAME, "parallel")?.unwrap_or(defaults.parallel),
        })
    }
}

/// `[secondary]`: raw indexer settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GsiSettings {
    pub settings: IndexMap<String, String>,
}

impl GsiSettings {
    pub const STORAGE_MODE: &'static str = "indexer.settings.storage_mode";

    pub fn storage_mode(&self) -> Option<&str> {
        self.settings.get(Self::STORAGE_MODE).map(String::as_str)
    }
}

/// `[server_group:<name>]` overrides for one server group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerGroupDefinition {
    pub nodes: Option<u32>,
    pub volume_size: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    pub cluster: ClusterSettings,
    pub bucket: BucketSettings,
    pub compaction: CompactionSettings,
    pub gsi_settings: GsiSettings,
    server_groups: BTreeMap<String, ServerGroupDefinition>,
}

impl TestConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_sections(&read_sections(path.as_ref())?)
    }

    pub fn from_sections(sections: &IniDocument) -> Result<Self> {
        let mut server_groups = BTreeMap::new();
        for (name, section) in sections {
            let Some(group) = name.strip_prefix(SERVER_GROUP_PREFIX) else {
                continue;
            };
            server_groups.insert(
                group.to_string(),
                ServerGroupDefinition {
                    nodes: parse_opt(Some(section), name, "nodes")?,
                    volume_size: non_empty(Some(section), "volume_size"),
                },
            );
        }

        Ok(Self {
            cluster: ClusterSettings::from_section(sections.get("cluster"))?,
            bucket: BucketSettings::from_section(sections.get("bucket"))?,
            compaction: CompactionSettings::from_section(sections.get("compaction"))?,
            gsi_settings: GsiSettings {
                settings: sections.get("secondary").cloned().unwrap_or_default(),
            },
            server_groups,
        })
    }

    /// Overrides for a server group, empty when the group has no section.
    pub fn server_group_definition(&self, name: &str) -> ServerGroupDefinition {
        self.server_groups.get(name).cloned().unwrap_or_default()
    }
}

fn non_empty(section: Option<&Section>, key: &str) -> Option<String> {
    section
        .and_then(|s| s.get(key))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_utils::make_section;

    #[test]
    fn test_defaults_without_sections() {
        let config = TestConfig::from_sections(&IniDocument::new()).unwrap();

        assert_eq!(config.cluster.mem_quota, 0);
        assert_eq!(config.bucket.failover_timeout(), 120);
        assert!(config.bucket.autofailover_enabled);
        assert_eq!(config.compaction.db_percentage, 30);
        assert_eq!(config.gsi_settings.storage_mode(), None);
    }

    #[test]
    fn test_cluster_section() {
        let sections = IniDocument::from([make_section(
            "cluster",
            &[
                ("mem_quota", "51200"),
                ("fts_index_mem_quota", "2048"),
                ("online_cores", "12"),
                ("kernel_mem_limit_services", "kv index"),
            ],
        )]);

        let cluster = TestConfig::from_sections(&sections).unwrap().cluster;

        assert_eq!(cluster.mem_quota, 51200);
        assert_eq!(cluster.fts_index_mem_quota, 2048);
        assert_eq!(cluster.analytics_mem_quota, 0);
        assert_eq!(cluster.online_cores, 12);
        assert_eq!(cluster.kernel_mem_limit_services, vec!["kv", "index"]);
    }

    #[test]
    fn test_bucket_section() {
        let sections = IniDocument::from([make_section(
            "bucket",
            &[
                ("replica_number", "2"),
                ("compression_mode", ""),
                ("autofailover_enabled", "false"),
                ("failover_timeouts", "5,30"),
            ],
        )]);

        let bucket = TestConfig::from_sections(&sections).unwrap().bucket;

        assert_eq!(bucket.replica_number, Some(2));
        assert_eq!(bucket.compression_mode, None);
        assert!(!bucket.autofailover_enabled);
        assert_eq!(bucket.failover_timeout(), 30);
    }

    #[test]
    fn test_compaction_parallel_is_parsed() {
        let sections = IniDocument::from([make_section("compaction", &[("parallel", "false")])]);

        let compaction = TestConfig::from_sections(&sections).unwrap().compaction;

        assert!(!compaction.parallel);
    }

    #[test]
    fn test_server_group_definition() {
        let sections = IniDocument::from([make_section(
            "server_group:data-index",
            &[("nodes", "3"), ("volume_size", "500GB")],
        )]);

        let config = TestConfig::from_sections(&sections).unwrap();

        let group = config.server_group_definition("data-index");
        assert_eq!(group.nodes, Some(3));
        assert_eq!(group.volume_size.as_deref(), Some("500GB"));
        assert_eq!(config.server_group_definition("query"), ServerGroupDefinition::default());
    }

    #[test]
    fn test_invalid_value() {
        let sections = IniDocument::from([make_section("bucket", &[("failover_timeouts", "5,x")])]);

        let err = TestConfig::from_sections(&sections).unwrap_err();

        assert!(matches!(err, Error::Settings { ref section, .. } if section == "bucket"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.test");
        std::fs::write(&path, "[secondary]\nindexer.settings.storage_mode = plasma\n").unwrap();

        let config = TestConfig::load(&path).unwrap();

        assert_eq!(config.gsi_settings.storage_mode(), Some("plasma"));
    }
}
