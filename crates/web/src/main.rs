use std::sync::Arc;
use std::time::Duration;

use aiparse::ScoreParser;
use aiparse::extractors::OllamaClient;
use anyhow::Context;
use storage::Database;
use storage::services::Tournament;
use storage::store::{MemoryStore, PgStore, Store};

mod config;
mod error;
mod features;
mod routes;
mod state;

use config::Config;
use state::AppState;

/// Postgres when `DATABASE_URL` is set, otherwise a fresh in-memory store.
async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using the in-memory store; nothing will be persisted");
        return Ok(Arc::new(MemoryStore::new()));
    };

    tracing::info!(
        "Connecting to database at: {}",
        database_url.split('@').next_back().unwrap_or("unknown")
    );
    let db = Database::new(database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let store = PgStore::new(db);
    store
        .start_listener()
        .await
        .context("Failed to listen for table changes")?;

    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting kart scoreboard API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let store = open_store(&config).await?;
    let scope = config.score_scope.resolve(config.tournament_year);
    let tournament = Tournament::load(store, config.tournament_year, scope).await;
    tournament.spawn_sync();

    let client = OllamaClient::new(
        config.ollama_url.clone(),
        config.ollama_model.clone(),
        Duration::from_secs(config.ollama_timeout_secs),
    )
    .context("Failed to build the Ollama client")?;
    tracing::info!("Score parsing uses {} at {}", client.model(), config.ollama_url);
    match client.verify_model().await {
        Ok(true) => {}
        Ok(false) => tracing::warn!("Model {} is not pulled on the Ollama server", client.model()),
        Err(e) => tracing::warn!("Ollama server not reachable, score parsing will fail: {}", e),
    }

    let state = AppState::new(tournament, Arc::new(ScoreParser::new(client)));
    let app = routes::router(state, config.max_upload_bytes);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
