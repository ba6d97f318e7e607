//! Runtime configuration

use std::path::PathBuf;

/// Where documents live and how the shell behaves
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory; the metadata document is stored directly in it
    pub data_dir: PathBuf,

    /// File name of the metadata document
    pub meta_file: String,

    /// Subdirectory of `data_dir` holding one document per table
    pub tables_dir: String,

    /// Skip confirmation prompts for destructive commands
    pub assume_yes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            meta_file: "db_meta.json".to_string(),
            tables_dir: "data".to_string(),
            assume_yes: false,
        }
    }
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn meta_path(&self) -> PathBuf {
        self.data_dir.join(&self.meta_file)
    }

    pub fn tables_path(&self) -> PathBuf {
        self.data_dir.join(&self.tables_dir)
    }

    /// Path of the row document for `table`
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.tables_path().join(format!("{}.json", table))
    }
}
