//! File-backed storage engine
//!
//! One file per document under the configured data directory. Writes go to a
//! temporary file in the target directory which is then renamed over the
//! target, so a reader sees either the old or the new version.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::{
    config::Config,
    error::{Error, Result},
    storage::{Document, engine::Engine},
};

pub struct FileEngine {
    config: Config,
}

impl FileEngine {
    /// Opens the store, creating the data directories if needed
    pub fn new(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        fs::create_dir_all(config.tables_path())?;
        Ok(Self { config })
    }

    fn path(&self, doc: &Document) -> PathBuf {
        match doc {
            Document::Metadata => self.config.meta_path(),
            Document::Table(name) => self.config.table_path(name),
        }
    }

    fn write_atomic(path: &Path, value: &[u8]) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| Error::Storage(format!("invalid path {}", path.display())))?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(value)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }
}

impl Engine for FileEngine {
    fn set(&mut self, doc: &Document, value: Vec<u8>) -> Result<()> {
        let path = self.path(doc);
        tracing::debug!(path = %path.display(), bytes = value.len(), "writing {}", doc);
        Self::write_atomic(&path, &value).map_err(|err| match err {
            Error::Storage(msg) => Error::Storage(format!("write {}: {}", path.display(), msg)),
            other => other,
        })
    }

    fn get(&mut self, doc: &Document) -> Result<Option<Vec<u8>>> {
        let path = self.path(doc);
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Storage(format!("read {}: {}", path.display(), err))),
        }
    }

    fn delete(&mut self, doc: &Document) -> Result<()> {
        let path = self.path(doc);
        tracing::debug!(path = %path.display(), "deleting {}", doc);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::Storage(format!("delete {}: {}", path.display(), err))),
        }
    }
}
