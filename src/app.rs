/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → Authorizer 生成 → Router 組み立て
 * - Middleware の適用 (request-id / timeout / trace)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    services::authz::{Authorizer, ValidationMode, authorizer},
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG=info,gateway_authorizer=debug,tower_http=debug cargo run
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

        // Unwinds inside the authorizer boundary become denials, so never abort there.
        if abort_on_panic && !authorizer::in_guarded_evaluation() {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    let authorizer = build_authorizer(&config);
    tracing::info!(
        "starting authorizer in {:?} mode on {} (validation={}, credentials={})",
        config.app_env,
        config.addr,
        authorizer.mode().as_str(),
        config.accepted_credentials.len()
    );

    let state = AppState::new(Arc::new(authorizer));
    let app = middleware::http::apply(build_router(state), config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_authorizer(config: &Config) -> Authorizer {
    if config.validation_mode == ValidationMode::Allowlist && config.accepted_credentials.is_empty()
    {
        tracing::warn!("ACCEPTED_CREDENTIALS is empty; every request will be denied");
    }
    if config.validation_mode == ValidationMode::AllowIfPresent {
        tracing::warn!("VALIDATION_MODE=allow-if-present accepts any non-empty credential");
    }

    Authorizer::new(
        config.accepted_credentials.clone(),
        config.validation_mode,
        config.success_context.clone(),
    )
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api::v1::routes())
        .with_state(state)
}
