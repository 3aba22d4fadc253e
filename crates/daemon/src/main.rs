//! Lineup - Main Entry Point
//! Shared channel queues with a self-maintaining Slack display

mod settings;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use crate::settings::DaemonConfig;
use lineup_api_rpc::{RpcServer, RpcServerConfig};
use lineup_core::application::QueueEngine;
use lineup_core::port::time_provider::SystemTimeProvider;
use lineup_core::port::{ChatClient, DirectMessageListener, TimeProvider};
use lineup_infra_slack::{SlackChatClient, SlackConfig};
use lineup_infra_sqlite::{create_pool, run_migrations, SqliteQueueRepository, SqliteViewRepository};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::load()?;

    // 2. Initialize logging through a non-blocking stdout writer
    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stdout());
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("lineup=info"))?;

    if config.json_logs() {
        // Production: JSON structured logging
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(writer))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_writer(writer))
            .init();
    }

    info!("Lineup v{} starting...", VERSION);

    // 3. Initialize database
    let db_path = config.db_path();
    if let Some(parent) = Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    info!(db_path = %db_path, "Initializing database...");

    let pool = create_pool(&format!("sqlite://{}", db_path))
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let queue_repo = Arc::new(SqliteQueueRepository::new(pool.clone()));
    let view_repo = Arc::new(SqliteViewRepository::new(pool.clone(), time_provider.clone()));

    let slack_config =
        SlackConfig::new(config.slack_token()?).with_api_base(config.slack_api_base.as_str());
    let chat: Arc<dyn ChatClient> = Arc::new(
        SlackChatClient::new(slack_config)
            .map_err(|e| anyhow::anyhow!("Slack client setup failed: {}", e))?,
    );
    let listener = Arc::new(DirectMessageListener::new(chat.clone()));

    let engine_config = config.engine_config();
    info!(
        max_age = ?engine_config.max_age,
        repost_threshold = engine_config.repost_threshold,
        pop_max_attempts = engine_config.pop_max_attempts,
        "Engine configured"
    );
    let engine = Arc::new(QueueEngine::new(
        queue_repo,
        view_repo,
        chat.clone(),
        listener,
        time_provider,
        engine_config,
    ));

    // 5. Start JSON-RPC server
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let (addr, rpc_handle) = RpcServer::new(rpc_config, engine, chat)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %addr, "System ready");
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    pool.close().await;

    info!("Shutdown complete.");

    Ok(())
}
