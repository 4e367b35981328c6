pub mod factory;
pub mod gate;
pub mod issuer;
pub mod policy;
pub mod service;
pub mod signing_key;
pub mod validation;

pub use factory::build_auth_service;
pub use gate::{AuthError, Claim, Principal};
pub use policy::{Decision, PolicyRegistry};
pub use service::AuthService;
