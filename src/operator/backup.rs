// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::templates;
use crate::error::{Error, Result};
use crate::files::{ConfigFile, ManagedFile};
use crate::operator::OperatorPaths;
use crate::types::CouchbaseBackup;

pub struct CouchbaseBackupFile {
    file: ConfigFile<CouchbaseBackup>,
}

impl CouchbaseBackupFile {
    pub fn new(paths: &OperatorPaths) -> Self {
        Self {
            file: paths.open(templates::BACKUP),
        }
    }

    pub fn backup(&self) -> &CouchbaseBackup {
        self.file.document()
    }

    /// Cron expression of the full backup.
    pub fn set_schedule_time(&mut self, cron: &str) -> Result<()> {
        self.file
            .document_mut()
            .spec
            .full
            .as_mut()
            .ok_or_else(|| Error::MissingField("spec.full".to_string()))?
            .schedule = cron.to_string();
        Ok(())
    }
}

impl ManagedFile for CouchbaseBackupFile {
    type Document = CouchbaseBackup;

    fn config_file(&self) -> &ConfigFile<CouchbaseBackup> {
        &self.file
    }

    fn config_file_mut(&mut self) -> &mut ConfigFile<CouchbaseBackup> {
        &mut self.file
    }
}
