use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Server;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use task_tracker::{
    config::Config, db, identity::IdentityCodec, init_tracing, route::create_router, AppState,
};

// Entry point of the application
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    // Check if the database exists, if not, create it
    if !Sqlite::database_exists(&config.database_url)
        .await
        .unwrap_or(false)
    {
        tracing::info!(url = %config.database_url, "creating database");
        Sqlite::create_database(&config.database_url)
            .await
            .context("failed to create database")?;
    }

    let pool = db::connect(&config.database_url, config.max_connections)
        .await
        .context("failed to connect to the database")?;
    tracing::info!(max_connections = config.max_connections, "connected to the database");

    db::init_schema(&pool)
        .await
        .context("failed to create tables")?;

    let identity = match &config.cookie_secret {
        Some(secret) => IdentityCodec::new(secret.as_bytes()),
        None => {
            tracing::warn!("COOKIE_SECRET not set; identities will not survive a restart");
            IdentityCodec::random()?
        }
    };

    let app_state = Arc::new(AppState { db: pool.clone(), identity });
    let app = create_router(app_state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(addr = %addr, "server listening");

    Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
