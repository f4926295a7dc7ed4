use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use desi_config::AppConfig;
use desi_contract::ContractStore;
use desi_intent::classify;
use desi_runtime::VoiceRuntime;

#[derive(Debug, Parser)]
#[command(
    name = "desi-llm",
    version,
    about = "Deterministic multilingual emotional-assistant inference engine"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = ".desi/config.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the HTTP server (the default when no subcommand is given).
    Serve,
    /// Validate a contract document and print pool statistics.
    CheckContract {
        /// Contract file to check; defaults to the configured path, or the
        /// embedded contract when none is configured.
        #[arg(long)]
        path: Option<String>,
    },
    /// Classify one utterance and print the resulting intent as JSON.
    Classify { text: String },
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config))?;
    init_tracing(&config.telemetry.log_level);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::CheckContract { path } => {
            check_contract(path.or_else(|| config.contract.path.clone()))
        }
        Commands::Classify { text } => {
            println!("{}", serde_json::to_string_pretty(&classify(&text))?);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    let runtime = Arc::new(VoiceRuntime::from_config(&config));
    desi_http::serve(&config, runtime).await
}

fn check_contract(path: Option<String>) -> Result<()> {
    let store = match &path {
        Some(path) => {
            ContractStore::load_file(path).with_context(|| format!("validating {path}"))?
        }
        None => ContractStore::load_embedded().context("validating the embedded contract")?,
    };

    info!(
        source = path.as_deref().unwrap_or("embedded"),
        version = store.version(),
        pools = store.pool_count(),
        variants = store.variant_count(),
        "contract is valid"
    );
    println!(
        "contract {} ok: {} pools, {} variants",
        store.version(),
        store.pool_count(),
        store.variant_count()
    );
    Ok(())
}
