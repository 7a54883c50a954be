//! Jackpot API Server Binary

use clap::Parser;
use jackpot::{api::ApiServer, config::ConfigLoader, JackpotStore};

#[derive(Parser, Debug)]
#[command(name = "jackpot-api")]
#[command(about = "Jackpot betting API server", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// API server host
    #[arg(long)]
    host: Option<String>,

    /// API server port
    #[arg(long)]
    port: Option<u16>,

    /// Database directory
    #[arg(long)]
    db_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;

    // Command line flags win over file and environment
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(db_path) = args.db_path {
        config.storage.data_directory = db_path;
    }
    jackpot::config::validate(&config)?;

    println!("📂 Opening jackpot database: {}", config.storage.data_directory);
    let store = JackpotStore::open_with_config(&config.storage)?;

    ApiServer::new(config, store).run().await?;

    Ok(())
}
