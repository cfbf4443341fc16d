// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! INI bridge: documents are `section -> key -> value` maps handed to `rust-ini`.

use crate::error::{Error, Result};
use ::ini::Ini;
use serde::de::DeserializeOwned;
use serde::Serialize;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::path::Path;

/// Untyped INI content, sections and keys in file order.
pub type IniDocument = IndexMap<String, IndexMap<String, String>>;

/// Key used for properties that appear before the first section header
pub const GENERAL_SECTION: &str = "";

pub(crate) fn read_document<D: DeserializeOwned>(path: &Path) -> Result<D> {
    let ini = Ini::load_from_file(path)?;

    let mut sections = Map::new();
    for (section, properties) in ini.iter() {
        if section.is_none() && properties.is_empty() {
            continue;
        }
        let entry = sections
            .entry(section.unwrap_or(GENERAL_SECTION).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = entry {
            for (key, value) in properties.iter() {
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }

    Ok(serde_json::from_value(Value::Object(sections))?)
}

pub(crate) fn write_document<D: Serialize>(document: &D, path: &Path) -> Result<()> {
    let Value::Object(sections) = serde_json::to_value(document)? else {
        return Err(Error::InvalidDocument(format!(
            "{} must serialize to a map of sections",
            path.display()
        )));
    };

    let mut ini = Ini::new();
    for (section, properties) in sections {
        let Value::Object(properties) = properties else {
            return Err(Error::InvalidDocument(format!(
                "section [{section}] must be a map of keys"
            )));
        };
        let name = (section != GENERAL_SECTION).then_some(section);
        for (key, value) in properties {
            ini.set_to(name.clone(), key, scalar_to_string(value));
        }
    }

    ini.write_to_file(path)?;
    Ok(())
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
