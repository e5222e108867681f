//! Keystream cipher
//!
//! A symmetric byte-stream transform: the key bytes are cycled against the
//! plaintext and combined position-wise with XOR. The transform is its own
//! inverse, so `decrypt(encrypt(x, k), k) == x` for any bytes `x` and any
//! non-empty key `k`.
//!
//! The cipher carries no integrity check. Decrypting with the wrong key
//! yields garbage bytes rather than an error; callers must validate the
//! output structurally (see the codec) and never trust decrypted bytes
//! as-is.

use crate::error::{VaultError, VaultResult};

/// Encrypt plaintext by XOR against the cycled key
///
/// An empty plaintext yields an empty ciphertext. An empty key is rejected
/// with [`VaultError::InvalidKey`].
pub fn keystream_encrypt(plaintext: &[u8], key: &[u8]) -> VaultResult<Vec<u8>> {
    keystream_apply(plaintext, key)
}

/// Decrypt ciphertext produced by [`keystream_encrypt`] with the same key
pub fn keystream_decrypt(ciphertext: &[u8], key: &[u8]) -> VaultResult<Vec<u8>> {
    keystream_apply(ciphertext, key)
}

/// The shared involution behind encrypt and decrypt
fn keystream_apply(data: &[u8], key: &[u8]) -> VaultResult<Vec<u8>> {
    if key.is_empty() {
        return Err(VaultError::InvalidKey);
    }

    Ok(data
        .iter()
        .zip(key.iter().cycle())
        .map(|(byte, key_byte)| byte ^ key_byte)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let key = b"0123456789abcdef";
        let plaintext = b"Hello, World!";

        let ciphertext = keystream_encrypt(plaintext, key).unwrap();
        assert_ne!(ciphertext.as_slice(), plaintext.as_ref());

        let decrypted = keystream_decrypt(&ciphertext, key).unwrap();
        assert_eq!(decrypted.as_slice(), plaintext.as_ref());
    }

    #[test]
    fn test_round_trip_longer_than_key() {
        let key = b"abc";
        let plaintext: Vec<u8> = (0..10000).map(|i| (i % 256) as u8).collect();

        let ciphertext = keystream_encrypt(&plaintext, key).unwrap();
        let decrypted = keystream_decrypt(&ciphertext, key).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_empty_plaintext_is_identity_case() {
        let ciphertext = keystream_encrypt(b"", b"key").unwrap();
        assert!(ciphertext.is_empty());
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            keystream_encrypt(b"data", b""),
            Err(VaultError::InvalidKey)
        ));
        assert!(matches!(
            keystream_decrypt(b"data", b""),
            Err(VaultError::InvalidKey)
        ));
    }

    #[test]
    fn test_wrong_key_yields_garbage_not_error() {
        let plaintext = b"sensitive payload";
        let ciphertext = keystream_encrypt(plaintext, b"right key").unwrap();

        // Unauthenticated by design: the wrong key "succeeds" with noise
        let garbage = keystream_decrypt(&ciphertext, b"wrong key").unwrap();
        assert_ne!(garbage.as_slice(), plaintext.as_ref());
    }
}
