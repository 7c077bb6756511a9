//! Error types for RBAC store operations

use thiserror::Error;

/// RBAC operation result type
pub type Result<T> = std::result::Result<T, RbacError>;

/// Errors raised by a backing store or while decoding its rows.
///
/// These are always propagated to the caller verbatim and never retried.
#[derive(Error, Debug)]
pub enum StorageError {
    /// SQLite engine error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A single-row query matched nothing
    #[error("Query returned no rows")]
    NoRows,

    /// A column could not be decoded into the expected type
    #[error("Cannot decode column {column}: {reason}")]
    Decode { column: usize, reason: String },

    /// Error reported by any other backing store, message kept as-is
    #[error("{0}")]
    Backend(String),
}

impl StorageError {
    /// Wrap a message coming from a non-SQLite backend
    pub fn backend(message: impl Into<String>) -> Self {
        StorageError::Backend(message.into())
    }
}

/// RBAC store errors
#[derive(Error, Debug)]
pub enum RbacError {
    /// Backing store failure (connectivity, constraint, decode)
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Caller input rejected before touching storage
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RbacError {
    /// True for input validation failures
    pub fn is_validation(&self) -> bool {
        matches!(self, RbacError::Validation(_))
    }

    /// True for backing store failures
    pub fn is_storage(&self) -> bool {
        matches!(self, RbacError::Storage(_))
    }
}

impl From<rusqlite::Error> for RbacError {
    fn from(err: rusqlite::Error) -> Self {
        RbacError::Storage(StorageError::Sqlite(err))
    }
}
