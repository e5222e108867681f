//! Path management for gridvault
//!
//! Resolves the platform-appropriate base directory for vault data,
//! settings, and exported backups.

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{VaultError, VaultResult};

/// Manages all paths used by gridvault
#[derive(Debug, Clone)]
pub struct VaultPaths {
    /// Base directory for all gridvault data
    base_dir: PathBuf,
}

impl VaultPaths {
    /// Create a new VaultPaths instance using the platform data directory
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> VaultResult<Self> {
        let dirs = ProjectDirs::from("", "", "gridvault").ok_or_else(|| {
            VaultError::StorageFailure(
                "Could not determine a data directory for this platform".to_string(),
            )
        })?;

        Ok(Self {
            base_dir: dirs.data_dir().to_path_buf(),
        })
    }

    /// Create VaultPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the directory exported backups are written into
    pub fn backups_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the persisted record set
    pub fn records_file(&self) -> PathBuf {
        self.data_dir().join("records.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> VaultResult<()> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            VaultError::StorageFailure(format!("Failed to create base directory: {}", e))
        })?;

        std::fs::create_dir_all(self.data_dir()).map_err(|e| {
            VaultError::StorageFailure(format!("Failed to create data directory: {}", e))
        })?;

        std::fs::create_dir_all(self.backups_dir()).map_err(|e| {
            VaultError::StorageFailure(format!("Failed to create backup directory: {}", e))
        })?;

        Ok(())
    }
}
