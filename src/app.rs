/*
 * Responsibility
 * - Config 読み込み → 依存生成 (store / TokenService) → Router 組み立て
 * - Middleware の適用順を一箇所で決める
 * - axum::serve() で起動
 */
use std::{panic, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, handlers};
use crate::config::Config;
use crate::middleware;
use crate::repos::credentials::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
use crate::repos::stories::{MemoryStoryRepo, PgStoryRepo, StoryRepo};
use crate::services::auth::{TokenService, bootstrap};
use crate::services::blob::FsBlobStore;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,social_stories=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook() {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched.
        tracing::error!(%info, "panic");
        // The server keeps running; CatchPanicLayer answers the request with a 500.
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;
    init_panic_hook();

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    bootstrap::ensure_roles(state.credentials.as_ref())
        .await
        .context("failed to seed roles")?;

    let app = build_router(state, &config);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let (credentials, stories): (Arc<dyn CredentialStore>, Arc<dyn StoryRepo>) =
        match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .connect(url)
                    .await
                    .context("failed to connect to DATABASE_URL")?;
                (
                    Arc::new(PgCredentialStore::new(pool.clone())),
                    Arc::new(PgStoryRepo::new(pool)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory stores (data is lost on restart)");
                (
                    Arc::new(MemoryCredentialStore::new()),
                    Arc::new(MemoryStoryRepo::new()),
                )
            }
        };

    let blobs = Arc::new(FsBlobStore::new(config.blob_root.clone()));
    let tokens = Arc::new(TokenService::from_config(config));

    tracing::info!(
        credentials = credentials.backend_name(),
        stories = stories.backend_name(),
        blobs = "fs",
        "stores ready"
    );

    Ok(AppState::new(credentials, stories, blobs, tokens))
}

/// Full application router.
///
/// Layers, outermost first: envelope → http (request id, trace, limits, panics)
/// → cors → security headers → authentication gate → routes.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let routes = api::routes()
        .route("/health", get(handlers::health::health))
        .fallback(handlers::fallback::fallback);
    let routes = middleware::auth::access::apply(routes, state.clone());

    let router = routes.with_state(state);
    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    let router = middleware::http::apply(router, config);
    middleware::envelope::apply(router, config)
}
