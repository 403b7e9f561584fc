//! Scout daemon - chat API with optional web-search augmentation

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use scout::chat::ChatService;
use scout::config::{Config, Credentials};
use scout::error::Result;
use scout::llm::OpenAiClient;
use scout::proxy::ChatServer;
use scout::search::PerplexitySearch;

/// Scout - chat completions grounded in live web search
#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "A chat API that can ground answers in live web search results")]
#[command(version)]
pub struct Cli {
    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Override the listen address (e.g. 127.0.0.1:8000)
    #[arg(long, short = 'l', global = true)]
    pub listen: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the chat server (default command)
    #[command(name = "serve")]
    Serve,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => serve(cli.config, cli.listen).await,
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,scout=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config_path: Option<PathBuf>, listen: Option<String>) -> Result<()> {
    tracing::info!("Starting Scout daemon");

    let mut config = Config::load(config_path.as_deref())?;
    if let Some(listen_addr) = listen {
        config.server.listen_addr = listen_addr;
    }
    tracing::debug!("Config loaded: {:?}", config);

    let credentials = Credentials::from_env(&config);
    tracing::debug!("Credentials: {:?}", credentials);
    let llm_key = credentials.require_llm_key(&config)?;

    let llm = OpenAiClient::new(&config.llm, llm_key)?;
    tracing::info!("Completion provider ready: {}", config.llm.api_url);

    let search = PerplexitySearch::new(&config.search, credentials.search_api_key.clone())?;

    let service = ChatService::new(Arc::new(llm), Arc::new(search));

    let server = ChatServer::new(config.server.clone(), service);
    server.serve().await
}
