//! Service layer for gridvault
//!
//! The service layer provides the backup/restore orchestration on top of
//! the storage and codec layers, handling authorization, validation, and
//! the merge policy for restored records.

pub mod backup;

pub use backup::{BackupService, RestorePolicy, RestoreResult};
