// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{Error, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One document of a heterogeneous multi-document file, tagged by kind.
///
/// Only the type metadata and `metadata` are modelled; the rest is kept as-is
/// and converted to the matching k8s-openapi type on demand.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(flatten)]
    pub body: serde_json::Map<String, Value>,
}

impl Manifest {
    pub fn is_kind<K: k8s_openapi::Resource>(&self) -> bool {
        self.kind == K::KIND && self.api_version == K::API_VERSION
    }

    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn to_resource<K>(&self) -> Result<K>
    where
        K: k8s_openapi::Resource + DeserializeOwned,
    {
        if !self.is_kind::<K>() {
            return Err(Error::InvalidDocument(format!(
                "expected {}/{}, found {}/{}",
                K::API_VERSION,
                K::KIND,
                self.api_version,
                self.kind
            )));
        }
        Ok(serde_json::from_value(serde_json::to_value(self)?)?)
    }

    pub fn from_resource<K>(resource: &K) -> Result<Self>
    where
        K: k8s_openapi::Resource + Serialize,
    {
        Ok(serde_json::from_value(serde_json::to_value(resource)?)?)
    }

    /// Apply `f` to this document viewed as a `K`.
    ///
    /// Object keys that `K` does not model are carried over from the original
    /// document. Lists are taken from the typed view as a whole, so unmodelled
    /// keys inside list items are dropped.
    pub fn update<K>(&mut self, f: impl FnOnce(&mut K) -> Result<()>) -> Result<()>
    where
        K: k8s_openapi::Resource + Serialize + DeserializeOwned,
    {
        let original = serde_json::to_value(&*self)?;
        let mut resource = self.to_resource::<K>()?;
        let modelled = serde_json::to_value(&resource)?;
        f(&mut resource)?;

        let mut updated = serde_json::to_value(&resource)?;
        restore_unmodelled(&mut updated, &original, &modelled);
        *self = serde_json::from_value(updated)?;
        Ok(())
    }

    pub fn annotations_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.metadata.annotations.get_or_insert_with(BTreeMap::new)
    }
}

/// Copy into `target` every key of `original` that the typed round trip lost.
fn restore_unmodelled(target: &mut Value, original: &Value, modelled: &Value) {
    let (Value::Object(target), Value::Object(original)) = (target, original) else {
        return;
    };
    for (key, value) in original {
        match modelled.get(key) {
            Some(modelled) => {
                if let Some(target) = target.get_mut(key) {
                    restore_unmodelled(target, value, modelled);
                }
            }
            None => {
                target.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }
}
