//! Custom error types for gridvault
//!
//! This module defines the error hierarchy for the backup/restore core using
//! thiserror for ergonomic error definitions.

use thiserror::Error;

/// The main error type for gridvault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// A backup password was empty or missing
    #[error("A password is required for backup operations")]
    PasswordRequired,

    /// The record store held nothing to back up
    #[error("There are no records to back up")]
    NoRecordsToBackup,

    /// The backup could not be read; the file may be corrupted or the
    /// password may be wrong. The two causes are indistinguishable for
    /// legacy backup formats, which carry no integrity tag.
    #[error("The backup could not be read: the file is damaged or the password is incorrect")]
    InvalidBackupOrPassword,

    /// The supplied password does not match the one the backup was
    /// created with (current format only; detected via the key check)
    #[error("The password does not match this backup")]
    WrongPassword,

    /// The backup file is structurally damaged (current format only;
    /// detected before or after the integrity tag check)
    #[error("The backup file is damaged: {0}")]
    CorruptBackup(String),

    /// The backup was created by an incompatible (typically newer) app version
    #[error("This backup was created by an incompatible app version (format {0})")]
    UnsupportedVersion(String),

    /// Migration of a legacy backup recovered nothing at all
    #[error("No records could be recovered from this backup")]
    NoRecoverableRecords,

    /// An underlying cryptographic primitive failed
    #[error("Cryptography unavailable: {0}")]
    CryptoUnavailable(String),

    /// A cipher key of zero length was supplied
    #[error("Cipher key must not be empty")]
    InvalidKey,

    /// I/O or persistence layer failure
    #[error("Storage error: {0}")]
    StorageFailure(String),

    /// The user cancelled a file pick
    #[error("The operation was cancelled")]
    Cancelled,

    /// The authorization gate refused the operation
    #[error("Authorization was not granted: {0}")]
    AuthorizationDenied(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),
}

impl VaultError {
    /// Whether the user should be prompted to re-enter the password.
    ///
    /// `InvalidBackupOrPassword` is ambiguous by design (legacy formats
    /// have no integrity tag), so it prompts for re-entry rather than
    /// asserting the password was wrong.
    pub fn requires_password_retry(&self) -> bool {
        matches!(
            self,
            Self::InvalidBackupOrPassword | Self::WrongPassword | Self::PasswordRequired
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error means the backup format is not recognized
    pub fn is_unsupported_version(&self) -> bool {
        matches!(self, Self::UnsupportedVersion(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageFailure(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::StorageFailure(err.to_string())
    }
}

/// Result type alias for gridvault operations
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::PasswordRequired;
        assert_eq!(
            err.to_string(),
            "A password is required for backup operations"
        );
    }

    #[test]
    fn test_unsupported_version_display() {
        let err = VaultError::UnsupportedVersion("2.0".into());
        assert!(err.to_string().contains("incompatible app version"));
        assert!(err.to_string().contains("2.0"));
        assert!(err.is_unsupported_version());
    }

    #[test]
    fn test_requires_password_retry() {
        assert!(VaultError::InvalidBackupOrPassword.requires_password_retry());
        assert!(VaultError::WrongPassword.requires_password_retry());
        assert!(!VaultError::Cancelled.requires_password_retry());
        assert!(!VaultError::NoRecoverableRecords.requires_password_retry());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let vault_err: VaultError = io_err.into();
        assert!(matches!(vault_err, VaultError::StorageFailure(_)));
    }
}
