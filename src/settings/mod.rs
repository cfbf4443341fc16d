// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Harness settings read from the cluster spec and test config INI files.

pub mod cluster_spec;
pub mod test_config;

pub use cluster_spec::{ClusterSpec, ServerEntry};
pub use test_config::{
    BucketSettings, ClusterSettings, CompactionSettings, GsiSettings, ServerGroupDefinition,
    TestConfig,
};

use crate::error::{Error, Result};
use crate::files::{ConfigFile, FileType, IniDocument};
use indexmap::IndexMap;
use std::path::Path;
use std::str::FromStr;

pub(crate) type Section = IndexMap<String, String>;

pub(crate) fn read_sections(path: &Path) -> Result<IniDocument> {
    let mut file = ConfigFile::<IniDocument>::open(path, Some(FileType::Ini));
    file.load()?;
    Ok(file.document().clone())
}

fn invalid(section: &str, key: &str, value: &str) -> Error {
    Error::Settings {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Parse `key` from `section` if present.
pub(crate) fn parse_opt<T: FromStr>(
    section: Option<&Section>,
    name: &str,
    key: &str,
) -> Result<Option<T>> {
    match section.and_then(|s| s.get(key)) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(name, key, raw)),
        None => Ok(None),
    }
}

pub(crate) fn parse_or<T: FromStr>(
    section: Option<&Section>,
    name: &str,
    key: &str,
    default: T,
) -> Result<T> {
    Ok(parse_opt(section, name, key)?.unwrap_or(default))
}

pub(crate) fn parse_bool(section: Option<&Section>, name: &str, key: &str) -> Result<Option<bool>> {
    match section.and_then(|s| s.get(key)) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(invalid(name, key, raw)),
        },
        None => Ok(None),
    }
}

/// Split a comma or whitespace separated list.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
