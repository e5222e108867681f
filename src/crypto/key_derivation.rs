//! Key derivation using Argon2id
//!
//! Derives the cipher and MAC keys from the user's backup password using
//! Argon2id, a memory-hard key derivation function resistant to GPU/ASIC
//! attacks. A single derivation produces both keys so the password is
//! stretched exactly once per backup operation.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{VaultError, VaultResult};

/// Length of the per-backup random salt in bytes
pub const SALT_LEN: usize = 16;

/// Total derived key material: a 32-byte cipher key plus a 32-byte MAC key
const KEY_MATERIAL_LEN: usize = 64;

/// Parameters for key derivation
///
/// The defaults target roughly one second of derivation time on a mid-range
/// phone, trading startup latency for brute-force resistance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    #[serde(default = "default_memory_cost")]
    pub memory_cost: u32,
    /// Iteration count (Argon2 time cost, default: 3); must be at least 1
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// Parallelism degree (default: 4)
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_cost() -> u32 {
    65536
}

fn default_rounds() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    4
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: default_memory_cost(),
            rounds: default_rounds(),
            parallelism: default_parallelism(),
        }
    }
}

/// Derived key material, wiped from memory on drop
///
/// Holds both halves of one Argon2id derivation: the first 32 bytes key the
/// keystream cipher, the last 32 bytes key the integrity tag.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: [u8; KEY_MATERIAL_LEN],
}

impl KeyMaterial {
    /// The 32-byte key for the keystream cipher
    pub fn cipher_key(&self) -> &[u8] {
        &self.bytes[..32]
    }

    /// The 32-byte key for the integrity tag
    pub fn mac_key(&self) -> &[u8] {
        &self.bytes[32..]
    }
}

/// Derive cipher and MAC keys from a password and salt
///
/// Deterministic: the same (password, salt, params) triple always yields the
/// same key material. Failures of the underlying primitive surface as
/// [`VaultError::CryptoUnavailable`]; a weak or default key is never
/// silently substituted.
pub fn derive_key(password: &str, salt: &[u8], params: &KdfParams) -> VaultResult<KeyMaterial> {
    if params.rounds < 1 {
        return Err(VaultError::CryptoUnavailable(
            "key derivation requires at least one round".to_string(),
        ));
    }

    let argon2_params = Params::new(
        params.memory_cost,
        params.rounds,
        params.parallelism,
        Some(KEY_MATERIAL_LEN),
    )
    .map_err(|e| VaultError::CryptoUnavailable(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut bytes = [0u8; KEY_MATERIAL_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut bytes)
        .map_err(|e| VaultError::CryptoUnavailable(format!("Key derivation failed: {}", e)))?;

    Ok(KeyMaterial { bytes })
}

/// Generate a fresh random salt for a new backup
///
/// Every backup gets its own salt so the same password never produces the
/// same key twice, and so a backup restores correctly on any device.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}
