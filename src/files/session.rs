// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Scoped load/write sessions

use crate::error::Result;
use crate::files::ConfigFile;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ops::{Deref, DerefMut};
use tracing::{error, warn};

/// Anything backed by a single `ConfigFile`.
pub trait ManagedFile {
    type Document: Serialize + DeserializeOwned + Default;

    fn config_file(&self) -> &ConfigFile<Self::Document>;

    fn config_file_mut(&mut self) -> &mut ConfigFile<Self::Document>;

    /// Load the file and return a guard that writes it back when closed or dropped.
    fn session(&mut self) -> Result<Session<'_, Self>>
    where
        Self: Sized,
    {
        self.config_file_mut().load()?;
        Ok(Session {
            file: self,
            closed: false,
        })
    }

    /// Load, run `f`, then write regardless of the outcome.
    ///
    /// An error from `f` wins over a write error; the latter is only logged in that case.
    fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R>
    where
        Self: Sized,
    {
        let mut session = self.session()?;
        let outcome = f(&mut *session);
        let written = session.close();

        match outcome {
            Ok(value) => written.map(|()| value),
            Err(e) => {
                if let Err(write_error) = written {
                    warn!("Write after failed session also failed: {}", write_error);
                }
                Err(e)
            }
        }
    }
}

impl<D> ManagedFile for ConfigFile<D>
where
    D: Serialize + DeserializeOwned + Default,
{
    type Document = D;

    fn config_file(&self) -> &ConfigFile<D> {
        self
    }

    fn config_file_mut(&mut self) -> &mut ConfigFile<D> {
        self
    }
}

/// Guard over a loaded file. Dropping it writes the destination, including during unwinding.
pub struct Session<'a, F: ManagedFile> {
    file: &'a mut F,
    closed: bool,
}

impl<F: ManagedFile> Session<'_, F> {
    /// Write the destination and surface the write error.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.file.config_file().write()
    }
}

impl<F: ManagedFile> Deref for Session<'_, F> {
    type Target = F;

    fn deref(&self) -> &F {
        self.file
    }
}

impl<F: ManagedFile> DerefMut for Session<'_, F> {
    fn deref_mut(&mut self) -> &mut F {
        self.file
    }
}

impl<F: ManagedFile> Drop for Session<'_, F> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.file.config_file().write() {
            error!(
                "Failed to write {}: {}",
                self.file.config_file().destination().display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::BTreeMap;
    use std::fs;

    type Doc = BTreeMap<String, u32>;

    fn make_file(dir: &std::path::Path) -> ConfigFile<Doc> {
        let source = dir.join("source.yaml");
        fs::write(&source, "replicas: 1\n").unwrap();
        ConfigFile::open(source, None).with_destination(dir.join("dest.yaml"))
    }

    #[test]
    fn test_scoped_writes_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = make_file(dir.path());

        file.scoped(|f| {
            f.document_mut().insert("replicas".to_string(), 4);
            Ok(())
        })
        .unwrap();

        let written = fs::read_to_string(dir.path().join("dest.yaml")).unwrap();
        assert_eq!(written, "replicas: 4\n");
    }

    #[test]
    fn test_scoped_writes_on_error_and_returns_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = make_file(dir.path());

        let result: Result<()> = file.scoped(|f| {
            f.document_mut().insert("replicas".to_string(), 2);
            Err(Error::MissingField("spec.servers[0]".to_string()))
        });

        assert!(matches!(result, Err(Error::MissingField(_))));
        let written = fs::read_to_string(dir.path().join("dest.yaml")).unwrap();
        assert_eq!(written, "replicas: 2\n");
    }

    #[test]
    fn test_dropped_session_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = make_file(dir.path());

        {
            let mut session = file.session().unwrap();
            session.document_mut().insert("size".to_string(), 5);
        }

        let written = fs::read_to_string(dir.path().join("dest.yaml")).unwrap();
        assert!(written.contains("size: 5"));
        assert!(written.contains("replicas: 1"));
    }

    #[test]
    fn test_close_surfaces_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let mut file: ConfigFile<Doc> =
            ConfigFile::open(dir.path().join("in.yaml"), None).with_destination(blocker.join("out.yaml"));

        let session = file.session().unwrap();

        assert!(matches!(session.close(), Err(Error::Io(_))));
    }
}
