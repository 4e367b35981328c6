/*
 * Responsibility
 * - issuer / audience / 署名鍵 (SigningCredentials) をまとめた IssuerIdentity
 * - 起動時に一度だけ組み立て、以後は不変
 */
use jsonwebtoken::{Algorithm, EncodingKey};

use crate::config::{ConfigError, JwtIssuerOptions};
use crate::services::auth::signing_key::{Secret, SigningKeyMaterial};

/// Key + algorithm used to produce/verify token signatures. Always HS256.
#[derive(Clone, Debug)]
pub struct SigningCredentials {
    key: SigningKeyMaterial,
    algorithm: Algorithm,
}

impl SigningCredentials {
    pub fn hmac_sha256(key: SigningKeyMaterial) -> Self {
        Self {
            key,
            algorithm: Algorithm::HS256,
        }
    }

    pub fn key(&self) -> &SigningKeyMaterial {
        &self.key
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Key for signing; nothing in this service issues tokens yet.
    pub fn encoding_key(&self) -> EncodingKey {
        self.key.encoding_key()
    }
}

#[derive(Clone, Debug)]
pub struct IssuerIdentity {
    issuer: String,
    audience: String,
    credentials: SigningCredentials,
}

impl IssuerIdentity {
    /// Build from typed options. Issuer/audience may be empty; only the secret is required.
    pub fn build(options: &JwtIssuerOptions) -> Result<Self, ConfigError> {
        let key = SigningKeyMaterial::derive(&options.secret_key)?;

        Ok(Self::new(
            options.issuer.clone(),
            options.audience.clone(),
            SigningCredentials::hmac_sha256(key),
        ))
    }

    pub fn new(issuer: String, audience: String, credentials: SigningCredentials) -> Self {
        Self {
            issuer,
            audience,
            credentials,
        }
    }

    pub fn from_secret(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        secret: &Secret,
    ) -> Result<Self, ConfigError> {
        let key = SigningKeyMaterial::derive(secret)?;
        Ok(Self::new(
            issuer.into(),
            audience.into(),
            SigningCredentials::hmac_sha256(key),
        ))
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn credentials(&self) -> &SigningCredentials {
        &self.credentials
    }
}
