/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証 (401) / 認可ポリシー (403) を掛ける範囲をここで決める
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::project::{get_project, get_project_claims};
use crate::middleware::auth::{access, policy};
use crate::services::auth::policy::JWT_CLAIMS_POLICY;
use crate::state::AppState;

/// ルートが参照するポリシー名。起動時に登録済みか確認する。
pub const REQUIRED_POLICIES: &[&str] = &[JWT_CLAIMS_POLICY];

pub fn routes(state: AppState) -> Router<AppState> {
    let claims = Router::new().route("/project/claims", get(get_project_claims));
    let claims = policy::require(claims, state.clone(), JWT_CLAIMS_POLICY);

    let protected = Router::new()
        .route("/project", get(get_project))
        .merge(claims);

    // access は policy の外側 (先に認証、次に認可)
    access::apply(protected, state)
}
