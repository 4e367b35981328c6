//! Bearer token 検証 → AuthCtx を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` を受け取り、AuthService で署名・有効期限などを検証する
//! - 失敗理由 (AuthError の variant) はログにだけ残し、クライアントには一律 401 を返す
//! - 検証済みトークン本体も AuthCtx に載せる (下流で再検証はしない)

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// 保護対象の Router に認証を掛ける。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/project", get(get_project));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // route_layer: 未定義パスは 401 ではなく 404 のまま
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

/// `Authorization` から token を取り出す。scheme は大文字小文字を区別しない。
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(req.headers()) else {
        tracing::debug!("missing or non-bearer authorization header");
        return Err(AppError::Unauthorized);
    };

    let principal = match state.auth.authenticate(token) {
        Ok(principal) => principal,
        Err(err) => {
            tracing::warn!(error = ?err, "access token verification failed");
            return Err(err.into());
        }
    };

    let auth_ctx = AuthCtx::new(principal, token.to_owned());

    // middleware → extractor / policy middleware への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}
