use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use serde::Serialize;
use serde::de::IgnoredAny;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::services::auth::validation::TokenValidationPolicy;

/// Per-request rejection reasons. All of them surface to clients as a plain 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("malformed token")]
    Malformed,
    #[error("signature verification failed")]
    BadSignature,
    #[error("issuer mismatch")]
    IssuerMismatch,
    #[error("audience mismatch")]
    AudienceMismatch,
    #[error("missing 'exp' claim")]
    MissingExpiration,
    #[error("token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
                Self::BadSignature
            }
            _ => Self::Malformed,
        }
    }
}

/// A single key/value assertion. Keys may repeat (e.g. several `rol` claims).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Claim {
    pub key: String,
    pub value: String,
}

impl Claim {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Authenticated identity for the lifetime of one request.
#[derive(Debug, Clone)]
pub struct Principal {
    claims: Vec<Claim>,
    payload: Map<String, Value>,
    subject: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl Principal {
    fn from_payload(payload: Map<String, Value>, expires_at: Option<DateTime<Utc>>) -> Self {
        let claims = flatten_claims(&payload);
        let subject = payload.get("sub").and_then(Value::as_str).map(str::to_owned);

        Self {
            claims,
            payload,
            subject,
            expires_at,
        }
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// The decoded payload exactly as it was signed.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.claims
            .iter()
            .filter(move |c| c.key == key)
            .map(|c| c.value.as_str())
    }

    /// Case-sensitive exact match on both key and value.
    pub fn has_claim(&self, key: &str, value: &str) -> bool {
        self.values(key).any(|v| v == value)
    }
}

// string -> 1 claim, array -> 1 claim per element, null -> none,
// everything else -> its compact JSON text.
fn flatten_claims(payload: &Map<String, Value>) -> Vec<Claim> {
    fn push(out: &mut Vec<Claim>, key: &str, value: &Value) {
        match value {
            Value::Null => {}
            Value::String(s) => out.push(Claim::new(key, s.as_str())),
            other => out.push(Claim::new(key, other.to_string())),
        }
    }

    let mut out = Vec::with_capacity(payload.len());
    for (key, value) in payload {
        match value {
            Value::Array(items) => items.iter().for_each(|v| push(&mut out, key, v)),
            v => push(&mut out, key, v),
        }
    }
    out
}

// NumericDate: a JSON number of seconds that chrono can represent.
// Strings or values outside chrono's range (e.g. 1e300) are malformed.
fn numeric_date(value: &Value) -> Result<Option<(f64, DateTime<Utc>)>, AuthError> {
    let secs = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64().ok_or(AuthError::Malformed)?,
        _ => return Err(AuthError::Malformed),
    };

    DateTime::from_timestamp(secs.floor() as i64, 0)
        .map(|at| Some((secs, at)))
        .ok_or(AuthError::Malformed)
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::Malformed)
}

/// Step 1: three base64url segments, header and payload JSON objects.
fn parse_payload(raw_token: &str) -> Result<Map<String, Value>, AuthError> {
    let mut segments = raw_token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::Malformed);
    };

    serde_json::from_slice::<Map<String, Value>>(&decode_segment(header)?)
        .map_err(|_| AuthError::Malformed)?;
    decode_segment(signature)?;

    serde_json::from_slice(&decode_segment(payload)?).map_err(|_| AuthError::Malformed)
}

fn audience_matches(aud: Option<&Value>, expected: &str) -> bool {
    match aud {
        Some(Value::String(s)) => s == expected,
        Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(expected)),
        _ => false,
    }
}

/// Validate `raw_token` against `policy` using the current time.
pub fn authenticate(raw_token: &str, policy: &TokenValidationPolicy) -> Result<Principal, AuthError> {
    authenticate_at(raw_token, policy, Utc::now())
}

/// Same as [`authenticate`] with an explicit "now".
///
/// Checks run in a fixed order: structure, signature, issuer, audience,
/// expiration presence, lifetime. The first failure wins.
pub fn authenticate_at(
    raw_token: &str,
    policy: &TokenValidationPolicy,
    now: DateTime<Utc>,
) -> Result<Principal, AuthError> {
    let payload = parse_payload(raw_token)?;

    // Signature (HS256 only). The payload was already parsed above.
    jsonwebtoken::decode::<IgnoredAny>(
        raw_token,
        policy.decoding_key(),
        &policy.signature_validation(),
    )?;

    if policy.validate_issuer()
        && payload.get("iss").and_then(Value::as_str) != Some(policy.expected_issuer())
    {
        return Err(AuthError::IssuerMismatch);
    }

    if policy.validate_audience() && !audience_matches(payload.get("aud"), policy.expected_audience())
    {
        return Err(AuthError::AudienceMismatch);
    }

    let exp = match payload.get("exp") {
        Some(v) => numeric_date(v)?,
        None => None,
    };

    if policy.require_expiration() && exp.is_none() {
        return Err(AuthError::MissingExpiration);
    }

    if policy.validate_lifetime() {
        if let Some((exp_secs, _)) = exp {
            // The token is no longer valid at its exact expiry instant.
            let now_secs = now.timestamp_millis() as f64 / 1000.0;
            if now_secs >= exp_secs + policy.clock_skew().as_secs_f64() {
                return Err(AuthError::Expired);
            }
        }
    }

    Ok(Principal::from_payload(payload, exp.map(|(_, at)| at)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::issuer::IssuerIdentity;
    use crate::services::auth::signing_key::Secret;
    use crate::services::auth::validation::ValidationOptions;
    use jsonwebtoken::{Algorithm, Header};
    use serde_json::json;

    const SECRET: &str = "unit-test-secret-that-is-at-least-32-bytes";
    const NOW: i64 = 1_700_000_000;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(NOW, 0).unwrap()
    }

    fn policy_with(secret: &str, options: ValidationOptions) -> TokenValidationPolicy {
        let identity =
            IssuerIdentity::from_secret("workspace-api", "workspace-web", &Secret::new(secret))
                .unwrap();
        TokenValidationPolicy::from_issuer_identity(&identity, options)
    }

    fn policy() -> TokenValidationPolicy {
        policy_with(SECRET, ValidationOptions::default())
    }

    fn sign(claims: &Value) -> String {
        sign_with(SECRET, Algorithm::HS256, claims)
    }

    fn sign_with(secret: &str, alg: Algorithm, claims: &Value) -> String {
        let identity = IssuerIdentity::from_secret("", "", &Secret::new(secret)).unwrap();
        jsonwebtoken::encode(
            &Header::new(alg),
            claims,
            &identity.credentials().encoding_key(),
        )
        .unwrap()
    }

    fn hs256_header() -> String {
        URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#)
    }

    #[test]
    fn valid_token_yields_principal() {
        let token = sign(&json!({"sub": "user-1", "rol": "ApiAccess", "exp": NOW + 60}));
        let principal = authenticate_at(&token, &policy(), now()).unwrap();

        assert_eq!(principal.subject(), Some("user-1"));
        assert!(principal.has_claim("rol", "ApiAccess"));
        assert_eq!(principal.expires_at(), DateTime::from_timestamp(NOW + 60, 0));
    }

    #[test]
    fn wrong_key_is_bad_signature() {
        let token = sign_with("another-secret", Algorithm::HS256, &json!({"sub": "u"}));
        assert_eq!(
            authenticate_at(&token, &policy(), now()).unwrap_err(),
            AuthError::BadSignature
        );
    }

    #[test]
    fn other_hmac_algorithm_is_bad_signature() {
        let token = sign_with(SECRET, Algorithm::HS512, &json!({"sub": "u"}));
        assert_eq!(
            authenticate_at(&token, &policy(), now()).unwrap_err(),
            AuthError::BadSignature
        );
    }

    #[test]
    fn garbage_is_malformed() {
        for raw in ["", "abc", "a.b", "a.b.c", "....", "not a token at all"] {
            assert_eq!(
                authenticate_at(raw, &policy(), now()).unwrap_err(),
                AuthError::Malformed,
                "{raw:?}"
            );
        }
    }

    #[test]
    fn unparsable_payload_is_malformed_even_with_bad_signature() {
        let header = hs256_header();
        let not_base64 = format!("{header}.%%%notbase64%%%.AAAA");
        let not_an_object = format!("{header}.W10.AAAA");
        let not_json = format!("{header}.{}.AAAA", URL_SAFE_NO_PAD.encode(b"{oops"));

        for raw in [not_base64, not_an_object, not_json] {
            assert_eq!(
                authenticate_at(&raw, &policy(), now()).unwrap_err(),
                AuthError::Malformed,
                "{raw}"
            );
        }
    }

    #[test]
    fn well_formed_token_with_bad_signature_is_bad_signature() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"u"}"#);
        let raw = format!("{}.{payload}.AAAA", hs256_header());
        assert_eq!(
            authenticate_at(&raw, &policy(), now()).unwrap_err(),
            AuthError::BadSignature
        );
    }

    #[test]
    fn out_of_range_exp_is_malformed() {
        let token = sign(&json!({"sub": "u", "exp": 1e300}));
        assert_eq!(
            authenticate_at(&token, &policy(), now()).unwrap_err(),
            AuthError::Malformed
        );
    }

    #[test]
    fn non_numeric_exp_is_malformed() {
        let token = sign(&json!({"sub": "u", "exp": "tomorrow"}));
        assert_eq!(
            authenticate_at(&token, &policy(), now()).unwrap_err(),
            AuthError::Malformed
        );
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let past = sign(&json!({"exp": NOW - 1}));
        let at = sign(&json!({"exp": NOW}));
        let future = sign(&json!({"exp": NOW + 1}));

        assert_eq!(authenticate_at(&past, &policy(), now()).unwrap_err(), AuthError::Expired);
        assert_eq!(authenticate_at(&at, &policy(), now()).unwrap_err(), AuthError::Expired);
        assert!(authenticate_at(&future, &policy(), now()).is_ok());
    }

    #[test]
    fn missing_exp_is_accepted_by_default() {
        let token = sign(&json!({"sub": "u"}));
        let principal = authenticate_at(&token, &policy(), now()).unwrap();
        assert!(principal.expires_at().is_none());
    }

    #[test]
    fn identity_mismatch_ignored_unless_enabled() {
        let token = sign(&json!({"iss": "someone-else", "aud": "elsewhere"}));
        assert!(authenticate_at(&token, &policy(), now()).is_ok());

        let strict_iss = policy_with(
            SECRET,
            ValidationOptions {
                validate_issuer: true,
                validate_audience: false,
            },
        );
        assert_eq!(
            authenticate_at(&token, &strict_iss, now()).unwrap_err(),
            AuthError::IssuerMismatch
        );

        let strict_aud = policy_with(
            SECRET,
            ValidationOptions {
                validate_issuer: false,
                validate_audience: true,
            },
        );
        assert_eq!(
            authenticate_at(&token, &strict_aud, now()).unwrap_err(),
            AuthError::AudienceMismatch
        );
    }

    #[test]
    fn audience_array_matches_any_member() {
        let strict = policy_with(
            SECRET,
            ValidationOptions {
                validate_issuer: true,
                validate_audience: true,
            },
        );
        let token = sign(&json!({"iss": "workspace-api", "aud": ["other", "workspace-web"]}));
        assert!(authenticate_at(&token, &strict, now()).is_ok());
    }

    #[test]
    fn issuer_checked_before_lifetime() {
        let strict = policy_with(
            SECRET,
            ValidationOptions {
                validate_issuer: true,
                validate_audience: false,
            },
        );
        let token = sign(&json!({"iss": "nope", "exp": NOW - 10}));
        assert_eq!(
            authenticate_at(&token, &strict, now()).unwrap_err(),
            AuthError::IssuerMismatch
        );
    }

    #[test]
    fn claims_are_flattened_without_loss() {
        let token = sign(&json!({
            "sub": "user-1",
            "rol": ["ApiAccess", "Admin"],
            "n": 7,
            "ok": true,
            "gone": null,
        }));
        let principal = authenticate_at(&token, &policy(), now()).unwrap();

        let mut got: Vec<_> = principal
            .claims()
            .iter()
            .map(|c| (c.key.as_str(), c.value.as_str()))
            .collect();
        got.sort();

        assert_eq!(
            got,
            vec![
                ("n", "7"),
                ("ok", "true"),
                ("rol", "Admin"),
                ("rol", "ApiAccess"),
                ("sub", "user-1"),
            ]
        );
        assert_eq!(principal.values("rol").count(), 2);
        assert_eq!(principal.payload().len(), 5);
    }
}
