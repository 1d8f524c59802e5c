use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use portal_api::auth::{AuthError, PasswordService, TokenService};
use portal_api::config::{AppConfig, ConfigError, StoreBackend};
use portal_api::db::{self, Repositories};
use portal_api::memory::InMemoryStore;
use portal_api::seed::{self, SeedError};
use portal_api::{cors_layer, create_router, AppState};

/// Anything that stops the server from starting
#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid password hashing settings: {0}")]
    Password(#[from] AuthError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("seeding failed: {0}")]
    Seed(#[from] SeedError),
    #[error("invalid CLIENT_URL: {0}")]
    ClientUrl(#[from] axum::http::header::InvalidHeaderValue),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Portal API - Starting...");

    if let Err(e) = run().await {
        tracing::error!("Portal API failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;

    let repos = match &config.store {
        StoreBackend::Postgres { database_url } => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url).await?;
            db::run_migrations(&pool).await?;
            Repositories::postgres(pool)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Repositories::in_memory(Arc::new(InMemoryStore::new()))
        }
    };

    let passwords = PasswordService::new(config.password)?;
    if config.seed_on_startup {
        seed::seed(&repos, &passwords).await?;
    }

    let tokens = Arc::new(TokenService::with_lifetime(
        &config.jwt_secret,
        Duration::seconds(config.token_lifetime_secs),
    ));
    let state =
        AppState::new(&repos, passwords, tokens).with_error_details(!config.is_production());
    let app = create_router(state, cors_layer(config.client_url.as_deref())?);

    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Portal API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
