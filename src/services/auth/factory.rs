/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::services::auth::AuthService;
use crate::services::auth::issuer::IssuerIdentity;
use crate::services::auth::policy::PolicyRegistry;
use crate::services::auth::validation::{TokenValidationPolicy, ValidationOptions};

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, ConfigError> {
    let identity = IssuerIdentity::build(&config.jwt)?;

    let validation = TokenValidationPolicy::from_issuer_identity(
        &identity,
        ValidationOptions {
            validate_issuer: config.jwt.validate_issuer,
            validate_audience: config.jwt.validate_audience,
        },
    );

    tracing::info!(
        issuer = identity.issuer(),
        audience = identity.audience(),
        validate_issuer = validation.validate_issuer(),
        validate_audience = validation.validate_audience(),
        "bearer token validation configured"
    );

    Ok(Arc::new(AuthService::new(
        validation,
        PolicyRegistry::with_defaults(),
    )))
}
