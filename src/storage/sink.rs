//! File sink for backup transfer
//!
//! Abstracts where exported backup bytes go and where imported ones come
//! from. On a phone this is the platform's document picker and share
//! sheet; [`DirectoryFileSink`] is the plain-directory implementation used
//! on desktop hosts and in tests.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::config::VaultPaths;
use crate::error::{VaultError, VaultResult};

use super::file_io::write_bytes_atomic;

/// File extension of exported backups
pub const BACKUP_EXTENSION: &str = "gvb";

/// Destination and source of backup files
pub trait FileSink {
    /// Write backup bytes to a new file; returns its path
    fn write(&self, bytes: &[u8]) -> VaultResult<PathBuf>;

    /// Read a backup file
    fn read(&self, path: &Path) -> VaultResult<Vec<u8>>;

    /// Hand a written backup to the platform share surface
    fn share(&self, path: &Path) -> VaultResult<()>;

    /// Let the user pick a backup file to restore from
    ///
    /// Declining the pick fails with [`VaultError::Cancelled`].
    fn pick(&self) -> VaultResult<PathBuf>;
}

/// Sink that keeps timestamped backup files in a single directory
pub struct DirectoryFileSink {
    dir: PathBuf,
}

impl DirectoryFileSink {
    /// Create a sink writing into `dir`
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Create a sink writing into the app's default backup directory
    pub fn with_default_dir() -> VaultResult<Self> {
        let paths = VaultPaths::new()?;
        Ok(Self::new(paths.backups_dir()))
    }

    /// All backup files in the directory, newest first
    ///
    /// Filenames embed their creation timestamp, so lexicographic order is
    /// chronological order.
    pub fn list_backups(&self) -> VaultResult<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| {
            VaultError::StorageFailure(format!("Failed to read backup directory: {}", e))
        })? {
            let entry = entry.map_err(|e| {
                VaultError::StorageFailure(format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            if path
                .extension()
                .map_or(false, |ext| ext == BACKUP_EXTENSION)
            {
                backups.push(path);
            }
        }

        backups.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
        Ok(backups)
    }
}

impl FileSink for DirectoryFileSink {
    fn write(&self, bytes: &[u8]) -> VaultResult<PathBuf> {
        let now = Utc::now();
        let filename = format!(
            "gridvault-{}-{:03}.{}",
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis(),
            BACKUP_EXTENSION
        );
        let path = self.dir.join(filename);

        write_bytes_atomic(&path, bytes)?;
        info!("wrote backup file {}", path.display());
        Ok(path)
    }

    fn read(&self, path: &Path) -> VaultResult<Vec<u8>> {
        fs::read(path).map_err(|e| {
            VaultError::StorageFailure(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    fn share(&self, path: &Path) -> VaultResult<()> {
        // Hand-off point for the host platform's share sheet
        if !path.exists() {
            return Err(VaultError::StorageFailure(format!(
                "Backup file not found: {}",
                path.display()
            )));
        }
        info!("shared backup file {}", path.display());
        Ok(())
    }

    fn pick(&self) -> VaultResult<PathBuf> {
        // Without an interactive picker the newest backup is the pick
        self.list_backups()?
            .into_iter()
            .next()
            .ok_or(VaultError::Cancelled)
    }
}
