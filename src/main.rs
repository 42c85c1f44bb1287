use anyhow::{anyhow, Context};
use financst_client::app;
use financst_client::config::ClientConfig;
use financst_client::logging::{init_logging, LoggingConfig};
use financst_client::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env()).map_err(|e| anyhow!("failed to initialize logging: {}", e))?;

    let config = ClientConfig::from_env();
    config.validate().map_err(|e| anyhow!(e))?;

    let state = AppState::new(&config).context("failed to build client state")?;

    match state.user_api.ping().await {
        Ok(pong) => tracing::info!(
            "🔌 API at {} says {} (db: {})",
            config.api_url,
            pong.message,
            pong.db_status.as_deref().unwrap_or("unknown")
        ),
        Err(e) => tracing::warn!("API at {} unreachable, serving cached data: {}", config.api_url, e),
    }

    let mut scheduler = app::start(&state, &config).await.context("failed to start client")?;

    tracing::info!("🚀 Financst client running, press Ctrl+C to exit");
    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl+C")?;

    scheduler.stop().await.context("failed to stop scheduler")?;
    Ok(())
}
