/*
 * Responsibility
 * - 名前付き認可ポリシー ("claim X = value Y") の登録と評価
 * - 起動時に組み立てて AppState に Arc で載せる (以後は読み取りのみ)
 */
use std::collections::HashMap;

use thiserror::Error;

use crate::services::auth::gate::Principal;

pub const JWT_CLAIMS_POLICY: &str = "JWT Claims";
pub const ROLE_CLAIM: &str = "rol";
pub const API_ACCESS: &str = "ApiAccess";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    pub name: String,
    pub required_claim_key: String,
    pub required_claim_value: String,
}

impl AuthorizationPolicy {
    pub fn is_satisfied_by(&self, principal: &Principal) -> bool {
        principal.has_claim(&self.required_claim_key, &self.required_claim_value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("authorization policy not registered: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, AuthorizationPolicy>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the policies this service exposes to its routes.
    pub fn with_defaults() -> Self {
        Self::new().register(JWT_CLAIMS_POLICY, ROLE_CLAIM, API_ACCESS)
    }

    /// Later registrations under the same name replace earlier ones.
    pub fn register(
        mut self,
        name: impl Into<String>,
        required_claim_key: impl Into<String>,
        required_claim_value: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let policy = AuthorizationPolicy {
            name: name.clone(),
            required_claim_key: required_claim_key.into(),
            required_claim_value: required_claim_value.into(),
        };
        self.policies.insert(name, policy);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AuthorizationPolicy> {
        self.policies.get(name)
    }

    /// Startup check for policy names referenced by the router.
    pub fn ensure_registered<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), PolicyError> {
        for name in names {
            if !self.policies.contains_key(name) {
                return Err(PolicyError::NotFound(name.to_string()));
            }
        }
        Ok(())
    }

    /// Unknown policy names deny; they indicate misconfiguration, never an implicit allow.
    pub fn evaluate(&self, policy_name: &str, principal: &Principal) -> Decision {
        let Some(policy) = self.get(policy_name) else {
            tracing::error!(
                policy = policy_name,
                "authorization policy is not registered; denying"
            );
            return Decision::Deny;
        };

        if policy.is_satisfied_by(principal) {
            Decision::Allow
        } else {
            tracing::debug!(
                policy = policy_name,
                claim = %policy.required_claim_key,
                subject = ?principal.subject(),
                "required claim not present"
            );
            Decision::Deny
        }
    }
}
