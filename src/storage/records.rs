//! Record store
//!
//! The record store owns every [`Record`]; the backup service only reaches
//! them through the [`RecordStore`] trait and never holds one beyond a
//! single operation. The handle is passed in explicitly at construction,
//! so there is no ambient global state to reason about.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{VaultError, VaultResult};
use crate::models::{Record, RecordId};

use super::file_io::{read_json, write_json_atomic};

/// Access to the persisted record set
///
/// Implementations are accessed from one logical flow at a time; the host
/// app serializes backup and restore operations behind its UI gate.
pub trait RecordStore {
    /// All records, as independent copies keyed by id
    fn get_all(&self) -> VaultResult<HashMap<RecordId, Record>>;

    /// Insert or replace a record by id
    fn put(&self, record: Record) -> VaultResult<()>;

    /// Remove a record; returns whether it existed
    fn delete(&self, id: &RecordId) -> VaultResult<bool>;
}

/// In-memory record store
///
/// The default store for the host app's session state and for tests.
pub struct MemoryRecordStore {
    data: RwLock<HashMap<RecordId, Record>>,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store pre-populated with records
    pub fn with_records(records: Vec<Record>) -> Self {
        let data = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            data: RwLock::new(data),
        }
    }

    /// Number of records currently held
    pub fn count(&self) -> VaultResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| VaultError::StorageFailure(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryRecordStore {
    fn get_all(&self) -> VaultResult<HashMap<RecordId, Record>> {
        let data = self
            .data
            .read()
            .map_err(|e| VaultError::StorageFailure(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.clone())
    }

    fn put(&self, record: Record) -> VaultResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VaultError::StorageFailure(format!("Failed to acquire write lock: {}", e)))?;
        data.insert(record.id.clone(), record);
        Ok(())
    }

    fn delete(&self, id: &RecordId) -> VaultResult<bool> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VaultError::StorageFailure(format!("Failed to acquire write lock: {}", e)))?;
        Ok(data.remove(id).is_some())
    }
}

/// Serializable record file structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct RecordData {
    records: Vec<Record>,
}

/// JSON-file-backed record store
///
/// Every mutation is persisted immediately through an atomic write, so the
/// file on disk is never a partially-applied state.
pub struct JsonRecordStore {
    path: PathBuf,
    data: RwLock<HashMap<RecordId, Record>>,
}

impl JsonRecordStore {
    /// Open the store at `path`, loading existing records if the file exists
    pub fn open(path: PathBuf) -> VaultResult<Self> {
        let file_data: RecordData = read_json(&path)?;

        let data = file_data
            .records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Persist the current record set to disk
    fn save(&self, data: &HashMap<RecordId, Record>) -> VaultResult<()> {
        let mut records: Vec<Record> = data.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        write_json_atomic(&self.path, &RecordData { records })
    }
}

impl RecordStore for JsonRecordStore {
    fn get_all(&self) -> VaultResult<HashMap<RecordId, Record>> {
        let data = self
            .data
            .read()
            .map_err(|e| VaultError::StorageFailure(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.clone())
    }

    fn put(&self, record: Record) -> VaultResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VaultError::StorageFailure(format!("Failed to acquire write lock: {}", e)))?;
        data.insert(record.id.clone(), record);
        self.save(&data)
    }

    fn delete(&self, id: &RecordId) -> VaultResult<bool> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VaultError::StorageFailure(format!("Failed to acquire write lock: {}", e)))?;
        let existed = data.remove(id).is_some();
        if existed {
            self.save(&data)?;
        }
        Ok(existed)
    }
}
