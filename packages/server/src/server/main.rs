// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use storyswap_core::domains::auth::JwtService;
use storyswap_core::domains::swaps::moderation::ModerationPipeline;
use storyswap_core::kernel::scheduled_tasks::start_scheduler;
use storyswap_core::kernel::{PostgresStore, ServerDeps};
use storyswap_core::{server::build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storyswap_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting StorySwap API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let deps = ServerDeps::new(
        Arc::new(PostgresStore::new(pool.clone())),
        ModerationPipeline::from_config(&config.moderation),
        chrono::Duration::hours(config.swap_expiry_hours),
        Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone())),
    );

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = start_scheduler(deps.clone(), &config.reaper_cron)
        .await
        .context("Failed to start scheduled tasks")?;

    let app = build_app(deps, Some(pool), &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
