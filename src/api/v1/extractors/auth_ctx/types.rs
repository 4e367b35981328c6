/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - access middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - 生存期間は 1 リクエスト。永続化はしない
 */

use crate::services::auth::Principal;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `principal` は検証済み token の claim 集合
/// - `token` は検証済みの生 token（下流での参照用。再検証はしない）
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub principal: Principal,
    pub token: String,
}

impl AuthCtx {
    pub fn new(principal: Principal, token: String) -> Self {
        Self { principal, token }
    }
}
