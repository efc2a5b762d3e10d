use std::path::PathBuf;
use std::time::Duration;

use aiparse::extractors::OllamaClient;
use aiparse::extractors::ollama_client::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
use aiparse::{ScoreParser, ScoreReader};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "parse-scores")]
#[command(about = "Read player scores from a results screenshot", long_about = None)]
#[command(version)]
struct Cli {
    /// Screenshot of the results screen
    image: PathBuf,

    /// Player names, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    players: Vec<String>,

    #[arg(long, env = "OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, env = "OLLAMA_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("parse_scores={},aiparse={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let image = tokio::fs::read(&cli.image).await?;
    tracing::info!("Read {} ({} bytes)", cli.image.display(), image.len());

    let client = OllamaClient::new(
        cli.ollama_url,
        cli.model,
        Duration::from_secs(cli.timeout_secs),
    )?;
    if !client.verify_model().await? {
        tracing::warn!("Model {} is not pulled on the Ollama server", client.model());
    }
    let parser = ScoreParser::new(client);

    let scores = parser.read_scores(&image, &cli.players).await?;
    println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "scores": scores }))?);

    Ok(())
}
