//! Cryptographic functions for gridvault
//!
//! Provides the keystream cipher, Argon2id key derivation, and the
//! HMAC-SHA256 integrity tags used by the backup codec. One derivation per
//! operation produces both the cipher key and the MAC key.

pub mod cipher;
pub mod integrity;
pub mod key_derivation;

pub use cipher::{keystream_decrypt, keystream_encrypt};
pub use integrity::{compute_key_check, compute_tag, verify_key_check, verify_tag, TAG_LEN};
pub use key_derivation::{derive_key, generate_salt, KdfParams, KeyMaterial, SALT_LEN};
