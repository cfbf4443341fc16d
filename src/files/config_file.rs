// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Format-aware file holding one or more parsed documents

use crate::error::Result;
use crate::files::ini;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Ini,
    Yaml,
    Json,
}

impl FileType {
    /// Infer the format from the file extension. Anything that is not YAML or JSON is INI.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => FileType::Yaml,
            Some("json") => FileType::Json,
            _ => FileType::Ini,
        }
    }
}

/// A file read from `source` and written to `destination`.
///
/// The documents are kept in file order and there is always at least one:
/// a missing source or an empty YAML stream yields a single `D::default()`,
/// so the destination gets created on the first write.
#[derive(Debug, Clone)]
pub struct ConfigFile<D> {
    source: PathBuf,
    destination: PathBuf,
    file_type: FileType,
    documents: Vec<D>,
}

impl<D> ConfigFile<D>
where
    D: Serialize + DeserializeOwned + Default,
{
    pub fn open(path: impl Into<PathBuf>, file_type: Option<FileType>) -> Self {
        let source = path.into();
        let file_type = file_type.unwrap_or_else(|| FileType::from_path(&source));
        Self {
            destination: source.clone(),
            source,
            file_type,
            documents: vec![D::default()],
        }
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// The first document; for most files the whole content.
    pub fn document(&self) -> &D {
        &self.documents[0]
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.documents[0]
    }

    pub fn documents(&self) -> &[D] {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut [D] {
        &mut self.documents
    }

    #[instrument(skip(self), fields(source = %self.source.display()))]
    pub fn load(&mut self) -> Result<()> {
        self.documents = self.read_file()?;
        debug!("Loaded {} document(s)", self.documents.len());
        Ok(())
    }

    /// Point the source at the destination and load it.
    ///
    /// Call this before mutating anything when an earlier session already wrote the destination.
    pub fn reload_from_destination(&mut self) -> Result<()> {
        self.source = self.destination.clone();
        self.load()
    }

    fn read_file(&self) -> Result<Vec<D>> {
        if !self.source.is_file() {
            debug!("Source file does not exist, starting from an empty document");
            return Ok(vec![D::default()]);
        }

        let mut documents = match self.file_type {
            FileType::Yaml => {
                let text = fs::read_to_string(&self.source)?;
                let mut documents = Vec::new();
                for document in serde_yaml::Deserializer::from_str(&text) {
                    // Empty documents, e.g. after a trailing `---`, carry no content
                    let value: serde_yaml::Value = serde::Deserialize::deserialize(document)?;
                    if value.is_null() {
                        continue;
                    }
                    documents.push(serde_yaml::from_value(value)?);
                }
                documents
            }
            FileType::Json => {
                let text = fs::read_to_string(&self.source)?;
                vec![serde_json::from_str(&text)?]
            }
            FileType::Ini => vec![ini::read_document(&self.source)?],
        };

        if documents.is_empty() {
            documents.push(D::default());
        }
        Ok(documents)
    }

    /// Write all documents to the destination, creating parent directories as needed.
    #[instrument(skip(self), fields(destination = %self.destination.display()))]
    pub fn write(&self) -> Result<()> {
        if let Some(parent) = self.destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        match self.file_type {
            FileType::Yaml => {
                let mut out = String::new();
                for (i, document) in self.documents.iter().enumerate() {
                    if i > 0 {
                        out.push_str("---\n");
                    }
                    out.push_str(&serde_yaml::to_string(document)?);
                }
                fs::write(&self.destination, out)?;
            }
            FileType::Json => {
                let mut buf = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
                self.document().serialize(&mut serializer)?;
                buf.push(b'\n');
                fs::write(&self.destination, buf)?;
            }
            FileType::Ini => ini::write_document(self.document(), &self.destination)?,
        }

        info!(
            "Wrote {} document(s) to {}",
            self.documents.len(),
            self.destination.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::IniDocument;
    use crate::types::Manifest;
    use std::collections::BTreeMap;

    type Doc = BTreeMap<String, serde_json::Value>;

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_path(Path::new("a/b.yaml")), FileType::Yaml);
        assert_eq!(FileType::from_path(Path::new("a/b.yml")), FileType::Yaml);
        assert_eq!(FileType::from_path(Path::new("timings.json")), FileType::Json);
        assert_eq!(FileType::from_path(Path::new("tests/kv.test")), FileType::Ini);
        assert_eq!(FileType::from_path(Path::new("noext")), FileType::Ini);
    }

    #[test]
    fn test_missing_source_yields_single_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut file: ConfigFile<Doc> = ConfigFile::open(dir.path().join("absent.yaml"), None);

        file.load().unwrap();

        assert_eq!(file.documents().len(), 1);
        assert!(file.document().is_empty());
    }

    #[test]
    fn test_missing_source_is_created_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/new.json");
        let mut file: ConfigFile<Doc> = ConfigFile::open(&path, None);
        file.load().unwrap();
        file.document_mut()
            .insert("deploy".to_string(), serde_json::json!(12.5));

        file.write().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("    \"deploy\": 12.5"));
    }

    #[test]
    fn test_multi_document_yaml_keeps_order_on_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("multi.yaml");
        fs::write(&path, "kind: Secret\n---\nkind: Deployment\n---\nkind: Service\n").unwrap();

        let mut file: ConfigFile<Doc> = ConfigFile::open(&path, None);
        file.load().unwrap();
        let before = file.documents().to_vec();
        file.write().unwrap();
        file.load().unwrap();

        assert_eq!(file.documents(), before.as_slice());
        let kinds: Vec<_> = file
            .documents()
            .iter()
            .map(|d| d["kind"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(kinds, vec!["Secret", "Deployment", "Service"]);
    }

    #[test]
    fn test_trailing_separator_adds_no_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.yaml");
        fs::write(&path, "apiVersion: v1\nkind: Service\nmetadata:\n  name: a\n---\n").unwrap();

        let mut file: ConfigFile<Manifest> = ConfigFile::open(&path, None);
        file.load().unwrap();

        assert_eq!(file.documents().len(), 1);
        assert_eq!(file.document().name(), "a");

        file.write().unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("kind:").count(), 1);
        assert!(!text.contains("apiVersion: ''"));
    }

    #[test]
    fn test_separator_only_yaml_yields_single_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yaml");
        fs::write(&path, "---\n---\n").unwrap();

        let mut file: ConfigFile<Doc> = ConfigFile::open(&path, None);
        file.load().unwrap();

        assert_eq!(file.documents().len(), 1);
        assert!(file.document().is_empty());
    }

    #[test]
    fn test_reload_from_destination_reads_written_state() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("template.yaml");
        let dest = dir.path().join("out/rendered.yaml");
        fs::write(&source, "replicas: 1\n").unwrap();

        let mut file: ConfigFile<Doc> = ConfigFile::open(&source, None).with_destination(&dest);
        file.load().unwrap();
        file.document_mut()
            .insert("replicas".to_string(), serde_json::json!(3));
        file.write().unwrap();

        let mut reopened: ConfigFile<Doc> =
            ConfigFile::open(&source, None).with_destination(&dest);
        reopened.reload_from_destination().unwrap();

        assert_eq!(reopened.source(), dest.as_path());
        assert_eq!(reopened.document()["replicas"], serde_json::json!(3));
    }

    #[test]
    fn test_invalid_yaml_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "spec: [unclosed\n").unwrap();

        let mut file: ConfigFile<Doc> = ConfigFile::open(&path, None);

        assert!(matches!(file.load(), Err(crate::error::Error::Yaml(_))));
    }

    #[test]
    fn test_ini_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.test");
        fs::write(&path, "[cluster]\nmem_quota = 1024\n\n[bucket]\nreplica_number = 2\n").unwrap();

        let mut file: ConfigFile<IniDocument> = ConfigFile::open(&path, None);
        file.load().unwrap();
        file.document_mut()
            .entry("cluster".to_string())
            .or_default()
            .insert("online_cores".to_string(), "4".to_string());
        file.write().unwrap();
        file.load().unwrap();

        let doc = file.document();
        assert_eq!(doc["cluster"]["mem_quota"], "1024");
        assert_eq!(doc["cluster"]["online_cores"], "4");
        assert_eq!(doc["bucket"]["replica_number"], "2");
    }
}
