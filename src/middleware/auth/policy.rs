//! 名前付きポリシーによる認可 (claim 必須) → 満たさなければ 403
//!
//! access middleware の内側で動く前提。AuthCtx が無ければ 401 を返す。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// `router` の全ルートに `policy` を要求する。認証 (access::apply) はこの外側に掛けること。
pub fn require(router: Router<AppState>, state: AppState, policy: &'static str) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        state,
        move |State(state): State<AppState>, req: Request<Body>, next: Next| {
            authorize(state, policy, req, next)
        },
    ))
}

async fn authorize(
    state: AppState,
    policy: &'static str,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(ctx) = req.extensions().get::<AuthCtx>() else {
        tracing::warn!(policy, "policy check reached without an authenticated principal");
        return Err(AppError::Unauthorized);
    };

    if !state.auth.authorize(policy, &ctx.principal).is_allow() {
        tracing::info!(policy, subject = ?ctx.principal.subject(), "authorization denied");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(req).await)
}
