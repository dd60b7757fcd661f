//! Record keeping for completed conversions.
//!
//! The pipeline appends one [`VaultRecord`] per successful encode or decode
//! when the caller's [`Session`](crate::Session) names a user. Storage,
//! listing and deletion belong to the [`Vault`] implementation.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::container::Header;

/// Error type for vault backends.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Vault backend error: {0}")]
    Backend(String),
    #[error("Invalid vault record: {0}")]
    InvalidRecord(String),
}

/// Which direction a conversion went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Encoded,
    Decoded,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoded => write!(f, "encoded"),
            Self::Decoded => write!(f, "decoded"),
        }
    }
}

impl FromStr for Operation {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "encoded" => Ok(Self::Encoded),
            "decoded" => Ok(Self::Decoded),
            other => Err(VaultError::InvalidRecord(format!(
                "unknown operation `{other}`"
            ))),
        }
    }
}

/// One completed conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    /// Millisecond timestamp of creation; not guaranteed unique.
    pub id: u64,
    #[serde(rename = "type")]
    pub operation: Operation,
    pub filename: String,
    /// Size of the original file in bytes.
    pub size: u64,
    /// Only recorded for encodes.
    #[serde(rename = "dnaLength", skip_serializing_if = "Option::is_none", default)]
    pub symbol_sequence_length: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

impl VaultRecord {
    /// Record for a file that was just encoded under `header`.
    pub fn encoded(header: &Header) -> Self {
        Self {
            id: record_id(),
            operation: Operation::Encoded,
            filename: header.filename.clone(),
            size: header.original_size,
            symbol_sequence_length: Some(header.symbol_sequence_length),
            timestamp: header.created_at,
        }
    }

    /// Record for an artifact with `header` that was just decoded.
    pub fn decoded(header: &Header) -> Self {
        Self {
            id: record_id(),
            operation: Operation::Decoded,
            filename: header.filename.clone(),
            size: header.original_size,
            symbol_sequence_length: None,
            timestamp: Utc::now().trunc_subsecs(3),
        }
    }
}

fn record_id() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

/// Storage for per-user conversion records.
pub trait Vault {
    fn append_record(&mut self, user: &str, record: VaultRecord) -> Result<(), VaultError>;

    /// Records for `user`, newest first.
    fn list_records(&self, user: &str) -> Result<Vec<VaultRecord>, VaultError>;

    /// Remove the records of `user` with `id`. Returns whether any existed.
    fn delete_record(&mut self, user: &str, id: u64) -> Result<bool, VaultError>;
}

/// Vault kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryVault {
    records: HashMap<String, Vec<VaultRecord>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Vault for MemoryVault {
    fn append_record(&mut self, user: &str, record: VaultRecord) -> Result<(), VaultError> {
        self.records.entry(user.to_string()).or_default().push(record);
        Ok(())
    }

    fn list_records(&self, user: &str) -> Result<Vec<VaultRecord>, VaultError> {
        let mut records = self.records.get(user).cloned().unwrap_or_default();
        // Equal timestamps: last appended first.
        records.reverse();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    fn delete_record(&mut self, user: &str, id: u64) -> Result<bool, VaultError> {
        let Some(records) = self.records.get_mut(user) else {
            return Ok(false);
        };
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }
}
