use serde::Serialize;

use crate::services::auth::{Claim, Principal};

/// GET /project/claims のレスポンス
#[derive(Debug, Serialize)]
pub struct ClaimsResponse {
    pub sub: Option<String>,
    pub claims: Vec<Claim>,
}

impl From<&Principal> for ClaimsResponse {
    fn from(p: &Principal) -> Self {
        Self {
            sub: p.subject().map(str::to_owned),
            claims: p.claims().to_vec(),
        }
    }
}
