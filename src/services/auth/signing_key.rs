/*
 * Responsibility
 * - Secret (設定から来る生の文字列) → HMAC 鍵素材への変換
 * - 空・空白のみの secret は起動時に失敗させる (401 の嵐として実行時に気付くのを防ぐ)
 */
use std::fmt;

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::config::ConfigError;

pub const SECRET_KEY: &str = "JwtIssuerOptions:SecretKey";

/// Output size of HMAC-SHA-256. Shorter secrets are accepted but reported.
pub const RECOMMENDED_MIN_SECRET_BYTES: usize = 32;

/// Raw secret as read from configuration.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Symmetric key bytes, used as-is as the HMAC key (no hashing or stretching).
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKeyMaterial {
    bytes: Vec<u8>,
}

impl SigningKeyMaterial {
    pub fn derive(secret: &Secret) -> Result<Self, ConfigError> {
        if secret.is_blank() {
            return Err(ConfigError::Blank(SECRET_KEY));
        }

        let bytes = secret.as_bytes().to_vec();
        if bytes.len() < RECOMMENDED_MIN_SECRET_BYTES {
            tracing::warn!(
                len = bytes.len(),
                recommended = RECOMMENDED_MIN_SECRET_BYTES,
                "signing secret is shorter than the HMAC-SHA-256 output size"
            );
        }

        Ok(Self { bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.bytes)
    }

    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.bytes)
    }
}

impl fmt::Debug for SigningKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("SigningKeyMaterial")
            .field("len", &self.bytes.len())
            .finish()
    }
}
