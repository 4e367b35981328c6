//! Immutable rule set describing how an inbound bearer token is checked.
//!
//! Signature and lifetime checks are always strict. Issuer/audience string
//! checks are off unless explicitly enabled (single-tenant deployment); the
//! expected values are still carried so enabling them is a flag flip.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::services::auth::issuer::IssuerIdentity;

/// Identity-string checks that may be toggled. Everything else is fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    pub validate_issuer: bool,
    pub validate_audience: bool,
}

#[derive(Clone)]
pub struct TokenValidationPolicy {
    validate_issuer: bool,
    expected_issuer: String,
    validate_audience: bool,
    expected_audience: String,
    validate_signing_key: bool,
    algorithm: Algorithm,
    decoding_key: DecodingKey,
    require_expiration: bool,
    validate_lifetime: bool,
    clock_skew: Duration,
}

impl fmt::Debug for TokenValidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenValidationPolicy")
            .field("validate_issuer", &self.validate_issuer)
            .field("expected_issuer", &self.expected_issuer)
            .field("validate_audience", &self.validate_audience)
            .field("expected_audience", &self.expected_audience)
            .field("validate_signing_key", &self.validate_signing_key)
            .field("algorithm", &self.algorithm)
            .field("require_expiration", &self.require_expiration)
            .field("validate_lifetime", &self.validate_lifetime)
            .field("clock_skew", &self.clock_skew)
            .finish()
    }
}

impl TokenValidationPolicy {
    pub fn from_issuer_identity(identity: &IssuerIdentity, options: ValidationOptions) -> Self {
        let credentials = identity.credentials();

        Self {
            validate_issuer: options.validate_issuer,
            expected_issuer: identity.issuer().to_string(),
            validate_audience: options.validate_audience,
            expected_audience: identity.audience().to_string(),
            validate_signing_key: true,
            algorithm: credentials.algorithm(),
            decoding_key: credentials.key().decoding_key(),
            require_expiration: false,
            validate_lifetime: true,
            clock_skew: Duration::ZERO,
        }
    }

    pub fn validate_issuer(&self) -> bool {
        self.validate_issuer
    }

    pub fn expected_issuer(&self) -> &str {
        &self.expected_issuer
    }

    pub fn validate_audience(&self) -> bool {
        self.validate_audience
    }

    pub fn expected_audience(&self) -> &str {
        &self.expected_audience
    }

    pub fn validate_signing_key(&self) -> bool {
        self.validate_signing_key
    }

    pub fn require_expiration(&self) -> bool {
        self.require_expiration
    }

    pub fn validate_lifetime(&self) -> bool {
        self.validate_lifetime
    }

    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Library-level validation: signature only.
    ///
    /// Structure, `exp`/`iss`/`aud` are checked by the gate itself so each
    /// failure maps to its own `AuthError` and runs in a fixed order.
    pub(crate) fn signature_validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation
    }
}
