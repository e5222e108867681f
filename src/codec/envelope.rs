//! Backup envelope and wire format
//!
//! A backup travels as a single text line:
//!
//! ```text
//! GRIDVAULT::<version>::<base64 body>
//! ```
//!
//! The body is a JSON document carrying the format version (again, so the
//! two copies can be cross-checked), the per-backup salt, an ISO-8601
//! creation timestamp, the record count, the opaque ciphertext, and, for
//! the current format, the key check and integrity tag. Binary fields are
//! base64 strings inside the body.
//!
//! The header prefix is recognized for every format version ever issued;
//! an unknown version is rejected here, before anything else is looked at.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::KdfParams;
use crate::error::{VaultError, VaultResult};

use super::version::FormatVersion;

/// Literal magic prefix of every backup file
const MAGIC: &str = "GRIDVAULT";

/// Separator between the wire format's header fields
const SEPARATOR: &str = "::";

/// The on-wire unit of a backup
///
/// An envelope is an independent copy of the exported data; it never
/// aliases record store memory and is discarded after the transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupEnvelope {
    /// Version of the backup format (not the app version)
    pub format_version: FormatVersion,
    /// Random salt, unique to this backup
    pub salt: Vec<u8>,
    /// When the backup was created
    pub timestamp: DateTime<Utc>,
    /// Number of records in the payload, readable before decryption
    pub record_count: u32,
    /// Key derivation parameters the backup was written with
    pub kdf: Option<KdfParams>,
    /// Password verifier (current format only)
    pub key_check: Option<Vec<u8>>,
    /// Integrity tag over header and ciphertext (current format only)
    pub mac: Option<Vec<u8>>,
    /// The encrypted payload
    pub ciphertext: Vec<u8>,
}

/// Serialized shape of the envelope body
#[derive(Debug, Serialize, Deserialize)]
struct EnvelopeBody {
    format_version: String,
    /// Salt (base64 encoded)
    salt: String,
    timestamp: DateTime<Utc>,
    record_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kdf: Option<KdfParams>,
    /// Password verifier (base64 encoded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_check: Option<String>,
    /// Integrity tag (base64 encoded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mac: Option<String>,
    /// Ciphertext (base64 encoded)
    ciphertext: String,
}

/// Password-free metadata about a backup, for display before restoring
#[derive(Debug, Clone, PartialEq)]
pub struct BackupSummary {
    /// Version of the backup format
    pub format_version: FormatVersion,
    /// When the backup was created
    pub timestamp: DateTime<Utc>,
    /// Number of records the backup claims to hold
    pub record_count: u32,
}

impl BackupEnvelope {
    /// Serialize the envelope into its one-line wire form
    pub fn to_wire(&self) -> VaultResult<Vec<u8>> {
        let body = EnvelopeBody {
            format_version: self.format_version.as_str().to_string(),
            salt: STANDARD.encode(&self.salt),
            timestamp: self.timestamp,
            record_count: self.record_count,
            kdf: self.kdf.clone(),
            key_check: self.key_check.as_ref().map(|b| STANDARD.encode(b)),
            mac: self.mac.as_ref().map(|b| STANDARD.encode(b)),
            ciphertext: STANDARD.encode(&self.ciphertext),
        };

        let json = serde_json::to_vec(&body)
            .map_err(|e| VaultError::StorageFailure(format!("Failed to serialize backup: {}", e)))?;

        let line = format!(
            "{}{}{}{}{}",
            MAGIC,
            SEPARATOR,
            self.format_version.as_str(),
            SEPARATOR,
            STANDARD.encode(&json)
        );

        Ok(line.into_bytes())
    }

    /// Parse an envelope from wire bytes
    ///
    /// An unrecognized version in the header fails with
    /// [`VaultError::UnsupportedVersion`]; any structural damage to the
    /// header or body fails with [`VaultError::CorruptBackup`]. The body is
    /// plaintext, so the password can never be the cause here.
    pub fn from_wire(bytes: &[u8]) -> VaultResult<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| VaultError::CorruptBackup("backup is not valid text".to_string()))?;

        let mut parts = text.trim().splitn(3, SEPARATOR);
        let magic = parts.next().unwrap_or_default();
        let version_str = parts.next().unwrap_or_default();
        let body_b64 = parts.next().unwrap_or_default();

        if magic != MAGIC || version_str.is_empty() || body_b64.is_empty() {
            return Err(VaultError::CorruptBackup(
                "missing gridvault header".to_string(),
            ));
        }

        let format_version = FormatVersion::parse(version_str);
        if let FormatVersion::Unsupported(v) = &format_version {
            return Err(VaultError::UnsupportedVersion(v.clone()));
        }

        let json = STANDARD
            .decode(body_b64)
            .map_err(|e| VaultError::CorruptBackup(format!("invalid body encoding: {}", e)))?;

        let body: EnvelopeBody = serde_json::from_slice(&json)
            .map_err(|e| VaultError::CorruptBackup(format!("invalid body structure: {}", e)))?;

        if FormatVersion::parse(&body.format_version) != format_version {
            return Err(VaultError::CorruptBackup(
                "header and body disagree on the format version".to_string(),
            ));
        }

        Ok(Self {
            format_version,
            salt: decode_field(&body.salt, "salt")?,
            timestamp: body.timestamp,
            record_count: body.record_count,
            kdf: body.kdf,
            key_check: body
                .key_check
                .as_deref()
                .map(|s| decode_field(s, "key check"))
                .transpose()?,
            mac: body
                .mac
                .as_deref()
                .map(|s| decode_field(s, "integrity tag"))
                .transpose()?,
            ciphertext: decode_field(&body.ciphertext, "ciphertext")?,
        })
    }

    /// Parse only the metadata of a backup, without a password
    pub fn peek(bytes: &[u8]) -> VaultResult<BackupSummary> {
        let envelope = Self::from_wire(bytes)?;
        Ok(envelope.summary())
    }

    /// Password-free metadata of this envelope
    pub fn summary(&self) -> BackupSummary {
        BackupSummary {
            format_version: self.format_version.clone(),
            timestamp: self.timestamp,
            record_count: self.record_count,
        }
    }

    /// Canonical header bytes covered by the integrity tag
    ///
    /// Everything in the envelope except the tag itself and the ciphertext
    /// (which the tag covers separately).
    pub fn header_bytes(&self) -> Vec<u8> {
        format!(
            "{}{}{}{}{}{}{}{}{}",
            MAGIC,
            SEPARATOR,
            self.format_version.as_str(),
            SEPARATOR,
            STANDARD.encode(&self.salt),
            SEPARATOR,
            self.timestamp.to_rfc3339(),
            SEPARATOR,
            self.record_count
        )
        .into_bytes()
    }
}

fn decode_field(b64: &str, field: &str) -> VaultResult<Vec<u8>> {
    STANDARD
        .decode(b64)
        .map_err(|e| VaultError::CorruptBackup(format!("invalid {} encoding: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_envelope() -> BackupEnvelope {
        BackupEnvelope {
            format_version: FormatVersion::V1_5,
            salt: vec![7u8; 16],
            timestamp: Utc::now(),
            record_count: 3,
            kdf: Some(KdfParams::default()),
            key_check: Some(vec![1u8; 32]),
            mac: Some(vec![2u8; 32]),
            ciphertext: vec![0xAB; 64],
        }
    }

    #[test]
    fn test_wire_round_trip() {
        let envelope = create_test_envelope();
        let wire = envelope.to_wire().unwrap();

        let text = std::str::from_utf8(&wire).unwrap();
        assert!(text.starts_with("GRIDVAULT::1.5::"));
        assert!(!text.contains('\n'));

        let back = BackupEnvelope::from_wire(&wire).unwrap();
        assert_eq!(back, envelope);
    }

    #[test]
    fn test_legacy_envelope_without_tags_round_trips() {
        let envelope = BackupEnvelope {
            format_version: FormatVersion::V1_3,
            kdf: None,
            key_check: None,
            mac: None,
            ..create_test_envelope()
        };
        let wire = envelope.to_wire().unwrap();

        let back = BackupEnvelope::from_wire(&wire).unwrap();
        assert_eq!(back.format_version, FormatVersion::V1_3);
        assert!(back.key_check.is_none());
        assert!(back.mac.is_none());
    }

    #[test]
    fn test_future_version_rejected() {
        let wire = b"GRIDVAULT::2.0::eyJ9".to_vec();
        let result = BackupEnvelope::from_wire(&wire);
        match result {
            Err(VaultError::UnsupportedVersion(v)) => assert_eq!(v, "2.0"),
            other => panic!("expected UnsupportedVersion, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_header_is_corrupt() {
        assert!(matches!(
            BackupEnvelope::from_wire(b"not a backup at all"),
            Err(VaultError::CorruptBackup(_))
        ));
        assert!(matches!(
            BackupEnvelope::from_wire(b"OTHERAPP::1.5::eyJ9"),
            Err(VaultError::CorruptBackup(_))
        ));
    }

    #[test]
    fn test_garbled_body_is_corrupt() {
        assert!(matches!(
            BackupEnvelope::from_wire(b"GRIDVAULT::1.5::%%%not-base64%%%"),
            Err(VaultError::CorruptBackup(_))
        ));

        let valid_b64_bad_json = format!("GRIDVAULT::1.5::{}", STANDARD.encode(b"[1,2,3]"));
        assert!(matches!(
            BackupEnvelope::from_wire(valid_b64_bad_json.as_bytes()),
            Err(VaultError::CorruptBackup(_))
        ));
    }

    #[test]
    fn test_header_body_version_mismatch_is_corrupt() {
        let envelope = create_test_envelope();
        let wire = envelope.to_wire().unwrap();
        let text = String::from_utf8(wire).unwrap();

        // Re-tag the header with a different known version
        let forged = text.replacen("GRIDVAULT::1.5::", "GRIDVAULT::1.4::", 1);
        assert!(matches!(
            BackupEnvelope::from_wire(forged.as_bytes()),
            Err(VaultError::CorruptBackup(_))
        ));
    }

    #[test]
    fn test_peek_reads_metadata_without_password() {
        let envelope = create_test_envelope();
        let wire = envelope.to_wire().unwrap();

        let summary = BackupEnvelope::peek(&wire).unwrap();
        assert_eq!(summary.format_version, FormatVersion::V1_5);
        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.timestamp, envelope.timestamp);
    }

    #[test]
    fn test_header_bytes_cover_metadata() {
        let envelope = create_test_envelope();
        let header = envelope.header_bytes();

        let mut altered = envelope.clone();
        altered.record_count = 99;
        assert_ne!(altered.header_bytes(), header);
    }
}
