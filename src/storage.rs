//! Durable key-value storage for accounts and the active session.
//!
//! Every value is a JSON document stored under a fixed key in a sled tree.
//! Writes replace the whole value; there are no incremental updates.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Version tag written into every persisted structure.
pub const SCHEMA_VERSION: u32 = 1;

/// Key holding the full account table.
pub const ACCOUNTS_KEY: &str = "accounts";
/// Key holding the session's authenticated flag.
pub const AUTH_FLAG_KEY: &str = "isAuth";
/// Key holding the active session profile.
pub const SESSION_PROFILE_KEY: &str = "user";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unsupported schema version {found} under '{key}' (expected {expected})")]
    UnsupportedSchema {
        key: String,
        found: u32,
        expected: u32,
    },
}

/// Handle to the durable store. Cloning is cheap and shares the same database.
#[derive(Clone)]
pub struct Storage {
    db: sled::Db,
}

impl Storage {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        debug!("Opening sled database at '{}'", path.display());
        let db = sled::open(path)?;
        Ok(Storage { db })
    }

    /// In-memory database removed on drop.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Storage { db })
    }

    // Generic Helper: Put
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let serialized = serde_json::to_vec(value)?;
        self.db.insert(key.as_bytes(), serialized)?;
        Ok(())
    }

    // Generic Helper: Get
    pub fn get<T: for<'a> Deserialize<'a>>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.db.get(key.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.db.remove(key.as_bytes())?;
        Ok(())
    }

    pub fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.db.contains_key(key.as_bytes())?)
    }

    /// Write raw bytes, bypassing serialization
    #[cfg(test)]
    pub fn put_raw(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.db.insert(key.as_bytes(), value)?;
        Ok(())
    }

    /// Block until all pending writes reach disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        let bytes = self.db.flush()?;
        debug!("Flushed {} bytes to disk", bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        name: String,
        count: u64,
    }

    #[test]
    fn test_put_get_remove() {
        let storage = Storage::temporary().unwrap();
        let sample = Sample { name: "ann".to_string(), count: 3 };

        storage.put("sample", &sample).unwrap();
        assert!(storage.contains("sample").unwrap());
        assert_eq!(storage.get::<Sample>("sample").unwrap(), Some(sample));

        storage.remove("sample").unwrap();
        assert_eq!(storage.get::<Sample>("sample").unwrap(), None);
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let storage = Storage::temporary().unwrap();
        storage.put_raw("sample", b"not json").unwrap();

        assert!(matches!(
            storage.get::<Sample>("sample"),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_reopen_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");

        {
            let storage = Storage::open(&path).unwrap();
            storage.put("flag", &true).unwrap();
            storage.flush().unwrap();
        }

        let storage = Storage::open(&path).unwrap();
        assert_eq!(storage.get::<bool>("flag").unwrap(), Some(true));
    }
}
