//! [`Vault`] backed by a SQLite [`Database`].

use chrono::{DateTime, SecondsFormat, Utc};
use genestore_codec::{Operation, Vault, VaultError, VaultRecord};
use log::debug;
use rusqlite::{params, Row};
use std::path::Path;

use crate::database::Database;
use crate::errors::StoreError;

/// Per-user conversion records in a SQLite file.
#[derive(Debug)]
pub struct SqliteVault {
    db: Database,
}

impl SqliteVault {
    /// Open (or create) the vault at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            db: Database::open(path)?,
        })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            db: Database::in_memory()?,
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn close(self) -> Result<(), StoreError> {
        self.db.close()
    }

    pub fn insert(&self, user: &str, record: &VaultRecord) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute(
                "INSERT INTO records (user_id, id, operation, filename, size, dna_length, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user,
                    record.id as i64,
                    record.operation.to_string(),
                    record.filename,
                    record.size as i64,
                    record.symbol_sequence_length.map(|n| n as i64),
                    record
                        .timestamp
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                ],
            )
            .map_err(|e| StoreError::Insert(e.to_string()))?;
        debug!("stored {} record {} for {user}", record.operation, record.id);
        Ok(())
    }

    /// Records of `user`, newest first; ties go to the later insert.
    pub fn records(&self, user: &str) -> Result<Vec<VaultRecord>, StoreError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT id, operation, filename, size, dna_length, timestamp
                 FROM records
                 WHERE user_id = ?1
                 ORDER BY timestamp DESC, rowid DESC",
            )
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![user], RawRecord::from_row)
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            let raw = row.map_err(|e| StoreError::Query(e.to_string()))?;
            records.push(raw.into_record()?);
        }
        Ok(records)
    }

    /// Delete `user`'s records with `id`; returns how many went.
    pub fn remove(&self, user: &str, id: u64) -> Result<usize, StoreError> {
        self.db
            .connection()
            .execute(
                "DELETE FROM records WHERE user_id = ?1 AND id = ?2",
                params![user, id as i64],
            )
            .map_err(|e| StoreError::Delete(e.to_string()))
    }
}

impl Vault for SqliteVault {
    fn append_record(&mut self, user: &str, record: VaultRecord) -> Result<(), VaultError> {
        Ok(self.insert(user, &record)?)
    }

    fn list_records(&self, user: &str) -> Result<Vec<VaultRecord>, VaultError> {
        Ok(self.records(user)?)
    }

    fn delete_record(&mut self, user: &str, id: u64) -> Result<bool, VaultError> {
        Ok(self.remove(user, id)? > 0)
    }
}

/// Row as stored, before the text columns are parsed.
struct RawRecord {
    id: i64,
    operation: String,
    filename: String,
    size: i64,
    dna_length: Option<i64>,
    timestamp: String,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            operation: row.get(1)?,
            filename: row.get(2)?,
            size: row.get(3)?,
            dna_length: row.get(4)?,
            timestamp: row.get(5)?,
        })
    }

    fn into_record(self) -> Result<VaultRecord, StoreError> {
        let operation: Operation = self
            .operation
            .parse()
            .map_err(|e: VaultError| StoreError::Corrupt(e.to_string()))?;
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| StoreError::Corrupt(format!("timestamp `{}`: {e}", self.timestamp)))?
            .with_timezone(&Utc);

        Ok(VaultRecord {
            id: self.id as u64,
            operation,
            filename: self.filename,
            size: self.size as u64,
            symbol_sequence_length: self.dna_length.map(|n| n as u64),
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use genestore_codec::Header;

    fn record(id: u64, minute: u32, operation: Operation) -> VaultRecord {
        VaultRecord {
            id,
            operation,
            filename: format!("file{id}.bin"),
            size: id * 10,
            symbol_sequence_length: (operation == Operation::Encoded).then_some(id * 40),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 9, 8, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_append_and_list() {
        let mut vault = SqliteVault::in_memory().unwrap();
        vault.append_record("ada", record(1, 0, Operation::Encoded)).unwrap();
        vault.append_record("ada", record(2, 30, Operation::Decoded)).unwrap();
        vault.append_record("ada", record(3, 10, Operation::Encoded)).unwrap();
        vault.append_record("bob", record(4, 0, Operation::Encoded)).unwrap();

        let records = vault.list_records("ada").unwrap();
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(records[0], record(2, 30, Operation::Decoded));
        assert_eq!(records[1].symbol_sequence_length, Some(120));

        assert_eq!(vault.list_records("bob").unwrap().len(), 1);
        assert!(vault.list_records("carol").unwrap().is_empty());
    }

    #[test]
    fn test_equal_timestamps_latest_insert_first() {
        let mut vault = SqliteVault::in_memory().unwrap();
        vault.append_record("ada", record(1, 5, Operation::Encoded)).unwrap();
        vault.append_record("ada", record(2, 5, Operation::Encoded)).unwrap();
        let ids: Vec<u64> = vault
            .list_records("ada")
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_delete_is_scoped_to_user() {
        let mut vault = SqliteVault::in_memory().unwrap();
        vault.append_record("ada", record(7, 0, Operation::Encoded)).unwrap();
        vault.append_record("bob", record(7, 0, Operation::Encoded)).unwrap();

        assert!(vault.delete_record("ada", 7).unwrap());
        assert!(!vault.delete_record("ada", 7).unwrap());
        assert!(vault.list_records("ada").unwrap().is_empty());
        assert_eq!(vault.list_records("bob").unwrap().len(), 1);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genestore.db");

        let header = Header::new("scan.tiff", "image/tiff", 1234);
        let stored = VaultRecord::encoded(&header);
        {
            let mut vault = SqliteVault::open(&path).unwrap();
            vault.append_record("ada", stored.clone()).unwrap();
            vault.close().unwrap();
        }

        let vault = SqliteVault::open(&path).unwrap();
        let records = vault.list_records("ada").unwrap();
        assert_eq!(records, vec![stored]);
    }

    #[test]
    fn test_decoded_record_reads_back_unchanged() {
        let mut vault = SqliteVault::in_memory().unwrap();
        let header = Header::new("scan.tiff", "image/tiff", 1234);
        let stored = VaultRecord::decoded(&header);
        vault.append_record("ada", stored.clone()).unwrap();
        assert_eq!(vault.list_records("ada").unwrap(), vec![stored]);
    }

    #[test]
    fn test_corrupt_row() {
        let vault = SqliteVault::in_memory().unwrap();
        vault
            .database()
            .connection()
            .execute(
                "INSERT INTO records (user_id, id, operation, filename, size, dna_length, timestamp)
                 VALUES ('ada', 1, 'shredded', 'x', 1, NULL, '2024-01-01T00:00:00.000Z')",
                [],
            )
            .unwrap();
        let err = vault.list_records("ada").unwrap_err();
        assert!(matches!(err, VaultError::InvalidRecord(_)));
    }
}
