//! Document storage
//!
//! Byte-level persistence of named documents. The SQL layer decides what the
//! bytes mean; engines here only store, fetch and remove them.

use std::fmt::Display;

pub mod engine;
pub mod file;
pub mod memory;

/// Name of a stored document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Document {
    /// The metadata document holding every table schema
    Metadata,
    /// The row document of one table
    Table(String),
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Document::Metadata => write!(f, "metadata"),
            Document::Table(name) => write!(f, "table {}", name),
        }
    }
}
