//! gridvault - versioned, password-encrypted backup/restore core
//!
//! This library provides the backup subsystem of a local-first note vault:
//! it serializes the user's record set into a portable encrypted file and
//! recovers it later, including from files written by earlier, incompatible
//! schema versions of the same app.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (records, cells, ids)
//! - `crypto`: Key derivation, keystream cipher, integrity tags
//! - `codec`: The versioned backup envelope and its wire format
//! - `migrate`: Upgrades for payloads written by older backup formats
//! - `storage`: Record store, authorization gate, and file sink interfaces
//! - `services`: The backup/restore orchestration
//!
//! # Example
//!
//! ```rust,ignore
//! use gridvault::codec::BackupCodec;
//! use gridvault::services::{BackupService, RestorePolicy};
//! use gridvault::storage::{AlwaysAllow, MemoryRecordStore};
//!
//! let store = MemoryRecordStore::new();
//! let service = BackupService::new(&store, &AlwaysAllow, BackupCodec::default());
//!
//! let envelope = service.create_backup("correct horse battery")?;
//! let result = service.restore_backup(&envelope, "correct horse battery",
//!     RestorePolicy::replace_all())?;
//! println!("{}", result.summary());
//! ```

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod migrate;
pub mod models;
pub mod services;
pub mod storage;

pub use codec::{BackupCodec, BackupEnvelope, BackupSummary, FormatVersion};
pub use error::{VaultError, VaultResult};
pub use models::{Cell, ColorTag, Record, RecordId};
pub use services::{BackupService, RestorePolicy, RestoreResult};
pub use storage::{AuthorizationGate, FileSink, RecordStore};
