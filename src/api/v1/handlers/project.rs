/*
 * Responsibility
 * - /project 系 handler
 * - 認証・認可は routes 側の middleware で済んでいる前提 (ここでは再チェックしない)
 */
use axum::{Json, http::StatusCode};
use serde_json::{Value, json};

use crate::api::v1::{dto::project::ClaimsResponse, extractors::AuthCtxExtractor};

/// 認証済みなら誰でも (ポリシー無し)
pub async fn get_project() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({})))
}

/// "JWT Claims" ポリシー通過後のみ
pub async fn get_project_claims(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<ClaimsResponse> {
    Json(ClaimsResponse::from(&ctx.principal))
}
