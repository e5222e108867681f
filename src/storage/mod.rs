//! Storage layer for gridvault
//!
//! The collaborator interfaces the backup core consumes: the record store
//! that owns the data, the authorization gate fronting every backup and
//! restore, and the file sink backups travel through. All three are traits
//! with explicit handles; the host app wires its platform implementations
//! in at construction.

pub mod file_io;
pub mod gate;
pub mod records;
pub mod sink;

pub use file_io::{read_json, write_bytes_atomic, write_json_atomic};
pub use gate::{AlwaysAllow, AuthorizationGate};
pub use records::{JsonRecordStore, MemoryRecordStore, RecordStore};
pub use sink::{DirectoryFileSink, FileSink, BACKUP_EXTENSION};
