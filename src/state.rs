/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: AuthService (検証ポリシー + 認可ポリシー、起動後は読み取り専用)
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::services::auth::AuthService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}
