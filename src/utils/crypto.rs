// Cryptographic primitives for session credentials and anti-forgery tokens

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Nonce size for AES-256-GCM encryption (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Block (encryption) key size for AES-256 (256 bits)
pub const BLOCK_KEY_SIZE: usize = 32;

/// Hash (authentication) key size for HMAC-SHA256 (512 bits)
pub const HASH_KEY_SIZE: usize = 64;

/// Raw entropy of an anti-forgery state token (128 bits)
pub const STATE_TOKEN_SIZE: usize = 16;

/// Generate `length` bytes of cryptographically secure random data
#[must_use]
pub fn generate_random_key(length: usize) -> Vec<u8> {
    let mut key = vec![0u8; length];
    rand::rng().fill_bytes(&mut key);
    key
}

/// Generate an anti-forgery state token
///
/// 16 random bytes, base64url encoded without padding, so the token can be placed
/// in a query string and a cookie value without further escaping.
#[must_use]
pub fn generate_state_token() -> String {
    let mut token = [0u8; STATE_TOKEN_SIZE];
    rand::rng().fill_bytes(&mut token);
    general_purpose::URL_SAFE_NO_PAD.encode(token)
}

/// Encrypt bytes with AES-256-GCM
///
/// Returns `nonce || ciphertext` where the ciphertext carries the GCM tag.
///
/// # Errors
///
/// Returns an error if:
/// - Key length is invalid
/// - AES encryption fails
pub fn encrypt_bytes(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if key.len() != BLOCK_KEY_SIZE {
        return Err(anyhow!(
            "Invalid key length: expected {BLOCK_KEY_SIZE} bytes, got {}",
            key.len()
        ));
    }

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| anyhow!("AES encryption failed: {e}"))?;

    let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);
    Ok(combined)
}

/// Decrypt `nonce || ciphertext` produced by [`encrypt_bytes`]
///
/// # Errors
///
/// Returns an error if:
/// - Key length is invalid
/// - Data is shorter than a nonce
/// - AES decryption or tag verification fails
pub fn decrypt_bytes(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if key.len() != BLOCK_KEY_SIZE {
        return Err(anyhow!(
            "Invalid key length: expected {BLOCK_KEY_SIZE} bytes, got {}",
            key.len()
        ));
    }
    if data.len() < NONCE_SIZE {
        return Err(anyhow!("Invalid data length"));
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| anyhow!("AES decryption failed: {e}"))
}

/// Sign a message using HMAC-SHA256
///
/// # Errors
///
/// Returns an error if HMAC key setup fails
pub fn sign_hmac_sha256(message: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| anyhow!("Invalid HMAC key length: {e}"))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verify an HMAC-SHA256 tag in constant time
#[must_use]
pub fn verify_hmac_sha256(message: &[u8], key: &[u8], tag: &[u8]) -> bool {
    let Ok(mut mac) = <HmacSha256 as Mac>::new_from_slice(key) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(tag).is_ok()
}

/// Compare two byte strings without short-circuiting on the first difference
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BLOCK_KEY: &[u8] = b"test_key_32_bytes_long_for_test_";
    const TEST_HASH_KEY: &[u8] = b"test_secret_key_for_hmac_testing_32b";

    #[test]
    fn test_state_token_format() {
        let token = generate_state_token();
        // 16 bytes without padding encode to 22 characters
        assert_eq!(token.len(), 22);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        let decoded = general_purpose::URL_SAFE_NO_PAD.decode(&token).unwrap();
        assert_eq!(decoded.len(), STATE_TOKEN_SIZE);
    }

    #[test]
    fn test_state_tokens_are_unique() {
        let first = generate_state_token();
        let second = generate_state_token();
        assert_ne!(first, second);
    }

    #[test]
    fn test_generate_random_key_length() {
        assert_eq!(generate_random_key(HASH_KEY_SIZE).len(), 64);
        assert_eq!(generate_random_key(BLOCK_KEY_SIZE).len(), 32);
        assert_ne!(
            generate_random_key(BLOCK_KEY_SIZE),
            generate_random_key(BLOCK_KEY_SIZE)
        );
    }

    #[test]
    fn test_encrypt_decrypt_bytes() {
        let encrypted = encrypt_bytes(b"hello world", TEST_BLOCK_KEY).unwrap();
        assert_ne!(&encrypted[NONCE_SIZE..], b"hello world");

        let decrypted = decrypt_bytes(&encrypted, TEST_BLOCK_KEY).unwrap();
        assert_eq!(decrypted, b"hello world");
    }

    #[test]
    fn test_encryption_uses_fresh_nonce() {
        let first = encrypt_bytes(b"same", TEST_BLOCK_KEY).unwrap();
        let second = encrypt_bytes(b"same", TEST_BLOCK_KEY).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let encrypted = encrypt_bytes(b"secret", TEST_BLOCK_KEY).unwrap();
        let other_key = [7u8; BLOCK_KEY_SIZE];
        assert!(decrypt_bytes(&encrypted, &other_key).is_err());
    }

    #[test]
    fn test_invalid_key_length_rejected() {
        assert!(encrypt_bytes(b"data", b"short").is_err());
        assert!(decrypt_bytes(&[0u8; 40], b"short").is_err());
    }

    #[test]
    fn test_decrypt_truncated_data_fails() {
        assert!(decrypt_bytes(&[0u8; 4], TEST_BLOCK_KEY).is_err());
    }

    #[test]
    fn test_hmac_sign_and_verify() {
        let tag = sign_hmac_sha256(b"session|1700000000|abc", TEST_HASH_KEY).unwrap();
        assert_eq!(tag.len(), 32);
        assert!(verify_hmac_sha256(
            b"session|1700000000|abc",
            TEST_HASH_KEY,
            &tag
        ));
        assert!(!verify_hmac_sha256(
            b"session|1700000001|abc",
            TEST_HASH_KEY,
            &tag
        ));
        assert!(!verify_hmac_sha256(
            b"session|1700000000|abc",
            b"another key",
            &tag
        ));
    }

    #[test]
    fn test_hmac_deterministic() {
        let first = sign_hmac_sha256(b"message", TEST_HASH_KEY).unwrap();
        let second = sign_hmac_sha256(b"message", TEST_HASH_KEY).unwrap();
        assert_eq!(first, second, "HMAC signatures should be deterministic");
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
