use anyhow::Context;
use posture_config::{load_with_env, DEFAULT_CONFIG_FILE};
use posture_server::{router, store::open_store, AppState};
use posture_sources::Orchestrator;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ENV_CONFIG: &str = "POSTURE_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "posture_server=info,posture_sources=info,tower_http=info".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var(ENV_CONFIG)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = load_with_env(&config_path)?;

    let orchestrator = Orchestrator::from_config(&config.sources)
        .context("Failed to build HTTP client for source adapters")?;
    if !orchestrator.shodan_enabled() {
        tracing::info!("No Shodan API key configured, lookup disabled");
    }

    let store = open_store(&config.store);
    tracing::info!(backend = ?config.store.backend, "Report store ready");

    let state = Arc::new(AppState::new(store, orchestrator));
    let app = router(state, config.server.body_limit_bytes);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
