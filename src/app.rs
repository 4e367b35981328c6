/*
 * Responsibility
 * - Config読み込み → 依存生成 (AuthService) → Router 組み立て
 * - 起動前に設定不備 (secret 空・ポリシー未登録) を検出して失敗させる
 * - axum::serve() で起動
 */
use std::{panic, process, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::services::auth::build_auth_service;
use crate::state::AppState;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn init_tracing() {
    // RUST_LOG=info,bearer_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build process-level services. Everything here is immutable once returned.
pub fn build_state(config: &Config) -> Result<AppState> {
    let auth = build_auth_service(config).context("invalid JwtIssuerOptions")?;

    auth.policies()
        .ensure_registered(api::v1::REQUIRED_POLICIES.iter().copied())
        .context("route references an unregistered authorization policy")?;

    Ok(AppState::new(auth))
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    middleware::http::apply(router, REQUEST_TIMEOUT)
}
