mod config;
mod error;
mod handlers;
mod persistence;
mod state;

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use config::BackendConfig;
use persistence::load_state;
use state::AppState;

// ─── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "practice_backend=info,practice_core=warn".into()),
        )
        .init();

    info!("⚾ Practice Planner Backend (Rust) starting...");

    let config = BackendConfig::from_env();
    info!(
        "State file: {} | auto water breaks: {}",
        config.state_file.display(),
        config.auto_water_breaks
    );

    // Load persisted state
    let planner = load_state(&config.state_file).await;
    let addr = format!("0.0.0.0:{}", config.port);
    let app_state = AppState::new(planner, config);

    // CORS: the web client is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = handlers::router(app_state).layer(cors);

    info!("🚀 Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
