//! Backup codec
//!
//! Serializes a record set into an encrypted [`BackupEnvelope`] and decodes
//! envelopes back into records, routing older formats through the migration
//! chain.
//!
//! The current format is verified in two stages before anything is parsed:
//! the key check proves the password, the integrity tag proves the file.
//! Legacy formats carry neither, so for them a parse failure after
//! decryption stays deliberately ambiguous between a wrong password and a
//! damaged file.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crypto::{
    compute_key_check, compute_tag, derive_key, generate_salt, keystream_decrypt,
    keystream_encrypt, verify_key_check, verify_tag, KdfParams,
};
use crate::error::{VaultError, VaultResult};
use crate::migrate;
use crate::models::Record;

pub mod envelope;
pub mod version;

pub use envelope::{BackupEnvelope, BackupSummary};
pub use version::FormatVersion;

/// Canonical plaintext payload of a current-format backup
#[derive(Debug, Serialize, Deserialize)]
struct BackupPayload {
    records: Vec<Record>,
}

/// Encodes and decodes backup envelopes
pub struct BackupCodec {
    kdf: KdfParams,
}

impl BackupCodec {
    /// Create a codec with the given key derivation parameters
    pub fn new(kdf: KdfParams) -> Self {
        Self { kdf }
    }

    /// Serialize and encrypt a record set into a fresh envelope
    ///
    /// Every call generates a new random salt, so encoding the same records
    /// twice never yields the same ciphertext. An empty record set encodes
    /// successfully with `record_count = 0`.
    pub fn encode(&self, records: &[Record], password: &str) -> VaultResult<BackupEnvelope> {
        let salt = generate_salt();
        let keys = derive_key(password, &salt, &self.kdf)?;

        // Canonical form: records sorted by id
        let mut records = records.to_vec();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        let record_count = records.len() as u32;

        let plaintext = serde_json::to_vec(&BackupPayload { records })
            .map_err(|e| VaultError::StorageFailure(format!("Failed to serialize records: {}", e)))?;

        let ciphertext = keystream_encrypt(&plaintext, keys.cipher_key())?;

        let mut envelope = BackupEnvelope {
            format_version: FormatVersion::CURRENT,
            salt: salt.to_vec(),
            timestamp: chrono::Utc::now(),
            record_count,
            kdf: Some(self.kdf.clone()),
            key_check: Some(compute_key_check(keys.mac_key())?),
            mac: None,
            ciphertext,
        };
        envelope.mac = Some(compute_tag(
            keys.mac_key(),
            &envelope.header_bytes(),
            &envelope.ciphertext,
        )?);

        debug!("encoded backup of {} records", record_count);
        Ok(envelope)
    }

    /// Decrypt and parse an envelope back into records
    ///
    /// Older formats are handed to the migrator after decryption; their
    /// warnings are returned alongside the records, never dropped. A
    /// current-format envelope decodes without warnings.
    pub fn decode(
        &self,
        envelope: &BackupEnvelope,
        password: &str,
    ) -> VaultResult<(Vec<Record>, Vec<String>)> {
        if let FormatVersion::Unsupported(v) = &envelope.format_version {
            return Err(VaultError::UnsupportedVersion(v.clone()));
        }

        let params = envelope.kdf.clone().unwrap_or_else(|| self.kdf.clone());
        let keys = derive_key(password, &envelope.salt, &params)?;

        if envelope.format_version.is_current() {
            self.decode_current(envelope, &keys)
        } else {
            self.decode_legacy(envelope, &keys)
        }
    }

    /// Decode the current format: verify password, verify integrity, parse
    fn decode_current(
        &self,
        envelope: &BackupEnvelope,
        keys: &crate::crypto::KeyMaterial,
    ) -> VaultResult<(Vec<Record>, Vec<String>)> {
        let key_check = envelope
            .key_check
            .as_ref()
            .ok_or_else(|| VaultError::CorruptBackup("missing key check".to_string()))?;
        if !verify_key_check(keys.mac_key(), key_check)? {
            return Err(VaultError::WrongPassword);
        }

        let mac = envelope
            .mac
            .as_ref()
            .ok_or_else(|| VaultError::CorruptBackup("missing integrity tag".to_string()))?;
        if !verify_tag(keys.mac_key(), &envelope.header_bytes(), &envelope.ciphertext, mac)? {
            return Err(VaultError::CorruptBackup(
                "integrity tag mismatch".to_string(),
            ));
        }

        let plaintext = keystream_decrypt(&envelope.ciphertext, keys.cipher_key())?;

        // The tag already vouched for the bytes; a parse failure here means
        // the backup was written damaged, not that the password is wrong.
        let payload: BackupPayload = serde_json::from_slice(&plaintext)
            .map_err(|e| VaultError::CorruptBackup(format!("invalid payload: {}", e)))?;

        if payload.records.len() as u32 != envelope.record_count {
            return Err(VaultError::CorruptBackup(format!(
                "payload holds {} records but the envelope declares {}",
                payload.records.len(),
                envelope.record_count
            )));
        }

        debug!("decoded backup of {} records", payload.records.len());
        Ok((payload.records, Vec::new()))
    }

    /// Decode a legacy format: decrypt, parse leniently, migrate
    fn decode_legacy(
        &self,
        envelope: &BackupEnvelope,
        keys: &crate::crypto::KeyMaterial,
    ) -> VaultResult<(Vec<Record>, Vec<String>)> {
        let plaintext = keystream_decrypt(&envelope.ciphertext, keys.cipher_key())?;

        // No integrity tag exists for these formats: a wrong password and a
        // damaged file both surface as unparseable bytes.
        let raw: serde_json::Value = serde_json::from_slice(&plaintext)
            .map_err(|_| VaultError::InvalidBackupOrPassword)?;

        let (records, mut warnings) = migrate::migrate(raw, &envelope.format_version)?;

        if records.len() as u32 != envelope.record_count {
            warnings.push(format!(
                "backup declared {} records, recovered {}",
                envelope.record_count,
                records.len()
            ));
        }

        debug!(
            "decoded legacy {} backup: {} records, {} warnings",
            envelope.format_version,
            records.len(),
            warnings.len()
        );
        Ok((records, warnings))
    }
}

impl Default for BackupCodec {
    fn default() -> Self {
        Self::new(KdfParams::default())
    }
}
