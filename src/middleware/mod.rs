/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::access (認証 → 401), auth::policy (認可 → 403), http (request-id / trace / timeout)
 */
pub mod auth;
pub mod http;
