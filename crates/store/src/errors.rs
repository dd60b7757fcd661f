use std::error;
use std::fmt;

use genestore_codec::VaultError;

/// Database error types.
#[derive(Debug, Clone)]
pub enum StoreError {
    Connection(String),
    Initialization(String),
    Query(String),
    Insert(String),
    Delete(String),
    /// A stored row did not convert back into a record.
    Corrupt(String),
    Close(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "Database connection error: {e}"),
            Self::Initialization(e) => write!(f, "Database initialization error: {e}"),
            Self::Query(e) => write!(f, "Query error: {e}"),
            Self::Insert(e) => write!(f, "Insert error: {e}"),
            Self::Delete(e) => write!(f, "Delete error: {e}"),
            Self::Corrupt(e) => write!(f, "Corrupt vault row: {e}"),
            Self::Close(e) => write!(f, "Close error: {e}"),
        }
    }
}

impl error::Error for StoreError {}

impl From<StoreError> for VaultError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Corrupt(msg) => VaultError::InvalidRecord(msg),
            other => VaultError::Backend(other.to_string()),
        }
    }
}
