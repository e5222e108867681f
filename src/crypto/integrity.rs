//! Integrity tags for backup envelopes
//!
//! The keystream cipher is unauthenticated, so the current backup format
//! carries two HMAC-SHA256 values computed under the MAC half of the derived
//! key material:
//!
//! - a *key check*, an HMAC of a fixed context string, which proves the
//!   password is correct before anything is decrypted, and
//! - a *tag* over the envelope header and ciphertext, which proves the file
//!   was not altered.
//!
//! Verifying the key check first and the tag second lets the codec report
//! a wrong password and a damaged file as distinct errors. Legacy formats
//! predate both values and keep their ambiguous failure mode.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{VaultError, VaultResult};

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 output in bytes
pub const TAG_LEN: usize = 32;

/// Context string fed to the key check HMAC
const KEY_CHECK_CONTEXT: &[u8] = b"gridvault.key-check.v1";

/// Compute the integrity tag over the envelope header and ciphertext
pub fn compute_tag(mac_key: &[u8], header: &[u8], ciphertext: &[u8]) -> VaultResult<Vec<u8>> {
    let mut mac = new_mac(mac_key)?;
    mac.update(header);
    mac.update(ciphertext);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verify an integrity tag in constant time
pub fn verify_tag(
    mac_key: &[u8],
    header: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> VaultResult<bool> {
    let mut mac = new_mac(mac_key)?;
    mac.update(header);
    mac.update(ciphertext);
    Ok(mac.verify_slice(tag).is_ok())
}

/// Compute the password verifier stored in the envelope
pub fn compute_key_check(mac_key: &[u8]) -> VaultResult<Vec<u8>> {
    let mut mac = new_mac(mac_key)?;
    mac.update(KEY_CHECK_CONTEXT);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verify a password verifier in constant time
pub fn verify_key_check(mac_key: &[u8], key_check: &[u8]) -> VaultResult<bool> {
    let mut mac = new_mac(mac_key)?;
    mac.update(KEY_CHECK_CONTEXT);
    Ok(mac.verify_slice(key_check).is_ok())
}

fn new_mac(mac_key: &[u8]) -> VaultResult<HmacSha256> {
    <HmacSha256 as Mac>::new_from_slice(mac_key)
        .map_err(|e| VaultError::CryptoUnavailable(format!("Failed to initialize HMAC: {}", e)))
}
