use thiserror::Error;

/// Custom Result type for tabledb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for tabledb
///
/// Every kind is recoverable at the command boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed command text
    #[error("{0}")]
    Parse(String),
    /// Schema, type, arity or duplicate-name violation
    #[error("{0}")]
    Validation(String),
    /// Missing table or column
    #[error("{0}")]
    NotFound(String),
    /// I/O or encoding failure in persistence
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Storage(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Storage(value.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(value: tempfile::PersistError) -> Self {
        Error::Storage(value.error.to_string())
    }
}
