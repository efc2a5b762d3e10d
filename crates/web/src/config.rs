use anyhow::{Context, Result};
use chrono::Datelike;
use storage::models::ScopeSetting;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Falls back to the in-memory store when unset.
    pub database_url: Option<String>,
    pub tournament_year: i32,
    pub score_scope: ScopeSetting,
    pub ollama_url: String,
    pub ollama_model: String,
    pub ollama_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("PORT must be a number")?
                .parse()?,
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            tournament_year: match std::env::var("TOURNAMENT_YEAR") {
                Ok(year) => year.parse().context("TOURNAMENT_YEAR must be a year")?,
                Err(_) => chrono::Utc::now().year(),
            },
            score_scope: match std::env::var("SCORE_SCOPE") {
                Ok(scope) => scope
                    .parse()
                    .map_err(anyhow::Error::msg)
                    .context("SCORE_SCOPE must be 'year' or 'all'")?,
                Err(_) => ScopeSetting::TournamentYear,
            },
            ollama_url: std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| aiparse::extractors::ollama_client::DEFAULT_OLLAMA_URL.to_string()),
            ollama_model: std::env::var("OLLAMA_MODEL")
                .unwrap_or_else(|_| aiparse::extractors::ollama_client::DEFAULT_MODEL.to_string()),
            ollama_timeout_secs: std::env::var("OLLAMA_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .context("OLLAMA_TIMEOUT_SECS must be a number")?,
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
                .parse()
                .context("MAX_UPLOAD_BYTES must be a number")?,
        })
    }
}
