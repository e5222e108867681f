//! Backup service
//!
//! Orchestrates the whole backup and restore flow: authorization gate,
//! password and empty-store guards, encoding through the codec, and the
//! merge of restored records back into the store under the user's chosen
//! policy.
//!
//! Key derivation runs on the calling thread and can take on the order of
//! a second; callers move these operations off the UI thread and cancel,
//! if at all, before starting. The service itself never retries.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::codec::{BackupCodec, BackupEnvelope, BackupSummary};
use crate::error::{VaultError, VaultResult};
use crate::models::RecordId;
use crate::storage::{AuthorizationGate, FileSink, RecordStore};

/// Conflict rule applied when restored records collide with existing ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestorePolicy {
    /// Wipe the store and take the backup as the complete new record set.
    /// Implies overwrite semantics regardless of `overwrite_existing`.
    pub replace_all: bool,
    /// On an id collision, replace the stored record with the backup's copy
    pub overwrite_existing: bool,
}

impl RestorePolicy {
    /// Wipe the store and take the backup wholesale
    pub fn replace_all() -> Self {
        Self {
            replace_all: true,
            overwrite_existing: true,
        }
    }

    /// Merge, keeping the stored record on an id collision
    pub fn merge_keep_existing() -> Self {
        Self {
            replace_all: false,
            overwrite_existing: false,
        }
    }

    /// Merge, preferring the backup's record on an id collision
    pub fn merge_overwrite() -> Self {
        Self {
            replace_all: false,
            overwrite_existing: true,
        }
    }
}

/// Outcome of a restore operation
#[derive(Debug, Clone, Default)]
pub struct RestoreResult {
    /// Records written into the store
    pub restored_count: usize,
    /// Records skipped because their id already existed
    pub skipped_count: usize,
    /// Records the backup contained after decoding and migration
    pub total_in_backup: usize,
    /// Migration warnings, passed through from the codec
    pub warnings: Vec<String>,
    /// Ids that failed to persist; the operation does not roll back
    pub failed_ids: Vec<RecordId>,
}

impl RestoreResult {
    /// Whether every decoded record was handled without a persistence failure
    pub fn is_complete(&self) -> bool {
        self.failed_ids.is_empty()
    }

    /// Get a one-line summary of the outcome
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "Restored {} of {} records",
            self.restored_count, self.total_in_backup
        )];
        if self.skipped_count > 0 {
            parts.push(format!("{} skipped", self.skipped_count));
        }
        if !self.failed_ids.is_empty() {
            parts.push(format!("{} failed", self.failed_ids.len()));
        }
        if !self.warnings.is_empty() {
            parts.push(format!("{} warnings", self.warnings.len()));
        }
        parts.join(", ")
    }
}

/// Service for exporting and importing encrypted backups
pub struct BackupService<'a> {
    store: &'a dyn RecordStore,
    gate: &'a dyn AuthorizationGate,
    codec: BackupCodec,
}

impl<'a> BackupService<'a> {
    /// Create a new backup service over explicit collaborator handles
    pub fn new(
        store: &'a dyn RecordStore,
        gate: &'a dyn AuthorizationGate,
        codec: BackupCodec,
    ) -> Self {
        Self { store, gate, codec }
    }

    /// Export the full record set into an encrypted envelope
    ///
    /// The envelope holds independent copies of the records; nothing in it
    /// aliases store memory.
    pub fn create_backup(&self, password: &str) -> VaultResult<BackupEnvelope> {
        if !self.gate.authorize("Authenticate to export your records") {
            return Err(VaultError::AuthorizationDenied(
                "backup export was not authorized".to_string(),
            ));
        }

        if password.trim().is_empty() {
            return Err(VaultError::PasswordRequired);
        }

        let records = self.store.get_all()?;
        if records.is_empty() {
            return Err(VaultError::NoRecordsToBackup);
        }

        for record in records.values() {
            record.validate().map_err(VaultError::Validation)?;
        }

        let snapshot: Vec<_> = records.into_values().collect();
        info!("creating backup of {} records", snapshot.len());
        self.codec.encode(&snapshot, password)
    }

    /// Decode an envelope and merge its records into the store
    ///
    /// Per-record persistence failures are collected in the result, not
    /// raised; records already written stay written.
    pub fn restore_backup(
        &self,
        envelope: &BackupEnvelope,
        password: &str,
        policy: RestorePolicy,
    ) -> VaultResult<RestoreResult> {
        if !self.gate.authorize("Authenticate to restore a backup") {
            return Err(VaultError::AuthorizationDenied(
                "backup restore was not authorized".to_string(),
            ));
        }

        if password.trim().is_empty() {
            return Err(VaultError::PasswordRequired);
        }

        let (records, warnings) = self.codec.decode(envelope, password)?;

        let existing = self.store.get_all()?;

        let mut result = RestoreResult {
            total_in_backup: records.len(),
            warnings,
            ..RestoreResult::default()
        };

        if policy.replace_all {
            for id in existing.keys() {
                self.store.delete(id)?;
            }
        }

        let overwrite = policy.replace_all || policy.overwrite_existing;

        for record in records {
            if !overwrite && existing.contains_key(&record.id) {
                result.skipped_count += 1;
                continue;
            }

            let id = record.id.clone();
            match self.store.put(record) {
                Ok(()) => result.restored_count += 1,
                Err(e) => {
                    warn!("failed to restore record {}: {}", id, e);
                    result.failed_ids.push(id);
                }
            }
        }

        info!("{}", result.summary());
        Ok(result)
    }

    /// Create a backup and write it through the sink
    ///
    /// If the write fails the partial file must not be trusted; the error
    /// is reported and no recovery is attempted.
    pub fn export_to_sink(&self, password: &str, sink: &dyn FileSink) -> VaultResult<PathBuf> {
        let envelope = self.create_backup(password)?;
        let bytes = envelope.to_wire()?;
        sink.write(&bytes)
    }

    /// Restore from a backup file, letting the sink pick one if no path is given
    pub fn restore_from_sink(
        &self,
        path: Option<&Path>,
        password: &str,
        policy: RestorePolicy,
        sink: &dyn FileSink,
    ) -> VaultResult<RestoreResult> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => sink.pick()?,
        };

        let bytes = sink.read(&path)?;
        let envelope = BackupEnvelope::from_wire(&bytes)?;
        self.restore_backup(&envelope, password, policy)
    }

    /// Inspect a backup's metadata without a password
    pub fn peek_backup(&self, bytes: &[u8]) -> VaultResult<BackupSummary> {
        BackupEnvelope::peek(bytes)
    }
}
