//! Server binary: reads config, prepares storage, serves the API.

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use user_address_api::config::DEFAULT_LOG_FILTER;
use user_address_api::{app, ensure_database_exists, ensure_tables, AppConfig, AppState, StorageBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    let config = AppConfig::from_env()?;
    let state = match config.storage {
        StorageBackend::Postgres => {
            ensure_database_exists(&config.database_url).await?;
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;
            ensure_tables(&pool).await?;
            tracing::info!("database connected");
            AppState::postgres(pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on exit");
            AppState::in_memory()
        }
    };

    let listener = TcpListener::bind((config.host, config.port)).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
