//! # luxhubd — luxhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Initialize the `SQLite` pool, run migrations, seed admin/guest users
//! - Construct the LIFX and assistant clients
//! - Construct application services, injecting adapters via port traits
//! - Spawn the reconciler poll task (snapshot refresh + activation tick)
//! - Build the axum router and serve until shutdown
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use luxhub_adapter_assistant::AnthropicAssistant;
use luxhub_adapter_http_axum::{router, state::AppState};
use luxhub_adapter_lifx::LifxClient;
use luxhub_adapter_storage_sqlite_sqlx::{
    Config as DbConfig, SqlitePermissionRepository, SqliteUserRepository,
};
use luxhub_app::activation::ActivationTracker;
use luxhub_app::executor::CommandExecutor;
use luxhub_app::permission_service::PermissionService;
use luxhub_app::reconciler::Reconciler;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    if config.lifx.token.is_empty() {
        tracing::warn!("no LIFX token configured, cloud calls will be rejected");
    }

    // Database
    let db = DbConfig {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Adapters
    let users = Arc::new(SqliteUserRepository::new(pool.clone()));
    let permission_repo = SqlitePermissionRepository::new(pool);
    let lifx = Arc::new(LifxClient::new(config.lifx.clone())?);
    let assistant = Arc::new(AnthropicAssistant::new(config.assistant.clone())?);

    // Application services
    let tracker = Arc::new(ActivationTracker::new(config.activation_config()));
    let permissions = Arc::new(PermissionService::new(permission_repo, Arc::clone(&lifx)));
    let reconciler = Arc::new(Reconciler::new(
        Arc::clone(&lifx),
        Arc::clone(&tracker),
        config.matcher,
    ));
    let executor = Arc::new(CommandExecutor::new(
        Arc::clone(&lifx),
        tracker,
        config.executor_config(),
    ));

    // Poll loop: refresh the snapshot and tick the activation tracker.
    let poll = Arc::clone(&reconciler);
    let poll_interval = std::time::Duration::from_secs(config.activation.poll_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            poll.tick().await;
        }
    });

    // HTTP
    let state = AppState::new(users, permissions, reconciler, executor, assistant);
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "luxhubd listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
    }
    tracing::info!("shutting down");
}
