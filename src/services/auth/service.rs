//! AuthService: the published, read-only handle the HTTP layer calls.
//!
//! Holds the token validation policy and the policy registry. Built once at
//! startup and shared via `Arc`; request handling never mutates it.

use crate::services::auth::gate::{self, AuthError, Principal};
use crate::services::auth::policy::{Decision, PolicyRegistry};
use crate::services::auth::validation::TokenValidationPolicy;

#[derive(Debug, Clone)]
pub struct AuthService {
    validation: TokenValidationPolicy,
    policies: PolicyRegistry,
}

impl AuthService {
    pub fn new(validation: TokenValidationPolicy, policies: PolicyRegistry) -> Self {
        Self {
            validation,
            policies,
        }
    }

    /// Step 1: is there a valid principal for this bearer token?
    pub fn authenticate(&self, raw_token: &str) -> Result<Principal, AuthError> {
        gate::authenticate(raw_token, &self.validation)
    }

    /// Step 2: does the principal satisfy the named policy?
    pub fn authorize(&self, policy_name: &str, principal: &Principal) -> Decision {
        self.policies.evaluate(policy_name, principal)
    }

    pub fn validation(&self) -> &TokenValidationPolicy {
        &self.validation
    }

    pub fn policies(&self) -> &PolicyRegistry {
        &self.policies
    }
}
