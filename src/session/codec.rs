//! Authenticated, encrypted cookie values
//!
//! A credential is `base64url(timestamp | base64url(nonce || ciphertext) | base64url(mac))`
//! where the ciphertext is AES-256-GCM over the JSON record and the MAC is
//! HMAC-SHA256 over `name | timestamp | ciphertext`. Binding the cookie name into the
//! MAC keeps a value minted for one cookie from being replayed under another.

use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{GreenlightError, Result};
use crate::utils::crypto::{
    decrypt_bytes, encrypt_bytes, generate_random_key, sign_hmac_sha256, verify_hmac_sha256,
    BLOCK_KEY_SIZE, HASH_KEY_SIZE,
};
use crate::utils::LoggingHelper;

/// Browsers silently drop cookies larger than this
pub const MAX_CREDENTIAL_LENGTH: usize = 4096;

/// Tolerated clock drift for timestamps issued slightly in the future
const CLOCK_SKEW_SECONDS: i64 = 60;

/// Key pair shared by every encode and decode in the process
#[derive(Clone)]
pub struct SessionKeys {
    hash_key: Vec<u8>,
    block_key: [u8; BLOCK_KEY_SIZE],
}

impl SessionKeys {
    /// Generate a fresh random key pair
    #[must_use]
    pub fn generate() -> Self {
        let mut block_key = [0u8; BLOCK_KEY_SIZE];
        block_key.copy_from_slice(&generate_random_key(BLOCK_KEY_SIZE));
        Self {
            hash_key: generate_random_key(HASH_KEY_SIZE),
            block_key,
        }
    }

    /// Build a key pair from raw key material
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the hash key is shorter than 64 bytes or the
    /// block key is not exactly 32 bytes.
    pub fn from_keys(hash_key: &[u8], block_key: &[u8]) -> Result<Self> {
        if hash_key.len() < HASH_KEY_SIZE {
            return Err(GreenlightError::Configuration(format!(
                "Session hash key must be at least {HASH_KEY_SIZE} bytes, got {}",
                hash_key.len()
            )));
        }
        let block_key: [u8; BLOCK_KEY_SIZE] = block_key.try_into().map_err(|_| {
            GreenlightError::Configuration(format!(
                "Session block key must be exactly {BLOCK_KEY_SIZE} bytes, got {}",
                block_key.len()
            ))
        })?;

        Ok(Self {
            hash_key: hash_key.to_vec(),
            block_key,
        })
    }

    /// Decode base64 keys from configuration, or generate both when neither is set
    ///
    /// # Errors
    ///
    /// Returns a configuration error when only one key is set, when a key is not
    /// valid base64, or when a key has the wrong length.
    pub fn load_or_generate(hash_key_b64: &str, block_key_b64: &str) -> Result<Self> {
        match (hash_key_b64.trim(), block_key_b64.trim()) {
            ("", "") => {
                LoggingHelper::log_generated_keys();
                Ok(Self::generate())
            }
            ("", _) | (_, "") => Err(GreenlightError::Configuration(
                "Both session hash key and block key must be set, or neither".to_string(),
            )),
            (hash, block) => {
                let hash = decode_config_key(hash, "hash")?;
                let block = decode_config_key(block, "block")?;
                Self::from_keys(&hash, &block)
            }
        }
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("hash_key", &"[REDACTED]")
            .field("block_key", &"[REDACTED]")
            .finish()
    }
}

fn decode_config_key(value: &str, which: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(value)
        .map_err(|e| GreenlightError::Configuration(format!("Session {which} key is not valid base64: {e}")))
}

/// Encodes records into tamper-evident, encrypted strings and back
#[derive(Clone, Debug)]
pub struct CredentialCodec {
    keys: Arc<SessionKeys>,
    max_age_seconds: i64,
}

impl CredentialCodec {
    /// `max_age_seconds <= 0` disables expiry checks
    #[must_use]
    pub fn new(keys: SessionKeys, max_age_seconds: i64) -> Self {
        Self {
            keys: Arc::new(keys),
            max_age_seconds,
        }
    }

    #[must_use]
    pub fn max_age_seconds(&self) -> i64 {
        self.max_age_seconds
    }

    /// Encode a record for the cookie called `name`, stamped with the current time
    ///
    /// # Errors
    ///
    /// Returns an encoding error if serialization or encryption fails, or if the
    /// result would be too large for a browser cookie.
    pub fn encode<T: Serialize>(&self, name: &str, record: &T) -> Result<String> {
        self.encode_at(name, record, chrono::Utc::now().timestamp())
    }

    /// Encode a record stamped with an explicit issue time (unix seconds)
    ///
    /// # Errors
    ///
    /// See [`CredentialCodec::encode`].
    pub fn encode_at<T: Serialize>(&self, name: &str, record: &T, issued_at: i64) -> Result<String> {
        let json =
            serde_json::to_vec(record).map_err(|e| GreenlightError::Encoding(e.to_string()))?;
        let ciphertext = encrypt_bytes(&json, &self.keys.block_key)
            .map_err(|e| GreenlightError::Encoding(e.to_string()))?;

        let payload = format!(
            "{issued_at}|{}",
            general_purpose::URL_SAFE_NO_PAD.encode(ciphertext)
        );
        let mac = sign_hmac_sha256(format!("{name}|{payload}").as_bytes(), &self.keys.hash_key)
            .map_err(|e| GreenlightError::Encoding(e.to_string()))?;

        let value = general_purpose::URL_SAFE_NO_PAD.encode(format!(
            "{payload}|{}",
            general_purpose::URL_SAFE_NO_PAD.encode(mac)
        ));

        if value.len() > MAX_CREDENTIAL_LENGTH {
            return Err(GreenlightError::Encoding(format!(
                "Encoded value is {} bytes, limit is {MAX_CREDENTIAL_LENGTH}",
                value.len()
            )));
        }
        Ok(value)
    }

    /// Decode a value previously produced by [`CredentialCodec::encode`]
    ///
    /// # Errors
    ///
    /// Returns [`GreenlightError::InvalidCredential`] for any forged, corrupted,
    /// malformed or expired value.
    pub fn decode<T: DeserializeOwned>(&self, name: &str, value: &str) -> Result<T> {
        self.decode_at(name, value, chrono::Utc::now().timestamp())
    }

    /// Decode a value, evaluating expiry at `now` (unix seconds)
    ///
    /// # Errors
    ///
    /// See [`CredentialCodec::decode`].
    pub fn decode_at<T: DeserializeOwned>(&self, name: &str, value: &str, now: i64) -> Result<T> {
        if value.is_empty() || value.len() > MAX_CREDENTIAL_LENGTH {
            return Err(GreenlightError::InvalidCredential);
        }

        let raw = general_purpose::URL_SAFE_NO_PAD
            .decode(value)
            .map_err(|_| GreenlightError::InvalidCredential)?;
        let raw = String::from_utf8(raw).map_err(|_| GreenlightError::InvalidCredential)?;

        let mut parts = raw.split('|');
        let (Some(timestamp), Some(ciphertext), Some(mac), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(GreenlightError::InvalidCredential);
        };

        let mac = general_purpose::URL_SAFE_NO_PAD
            .decode(mac)
            .map_err(|_| GreenlightError::InvalidCredential)?;
        let signed = format!("{name}|{timestamp}|{ciphertext}");
        if !verify_hmac_sha256(signed.as_bytes(), &self.keys.hash_key, &mac) {
            return Err(GreenlightError::InvalidCredential);
        }

        let issued_at: i64 = timestamp
            .parse()
            .map_err(|_| GreenlightError::InvalidCredential)?;
        if issued_at > now.saturating_add(CLOCK_SKEW_SECONDS) {
            return Err(GreenlightError::InvalidCredential);
        }
        if self.max_age_seconds > 0 && now.saturating_sub(issued_at) > self.max_age_seconds {
            return Err(GreenlightError::InvalidCredential);
        }

        let ciphertext = general_purpose::URL_SAFE_NO_PAD
            .decode(ciphertext)
            .map_err(|_| GreenlightError::InvalidCredential)?;
        let json = decrypt_bytes(&ciphertext, &self.keys.block_key)
            .map_err(|_| GreenlightError::InvalidCredential)?;

        serde_json::from_slice(&json).map_err(|_| GreenlightError::InvalidCredential)
    }
}
