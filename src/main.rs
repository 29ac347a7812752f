use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod cli;
mod config;
mod core;
mod http_client;
mod server;
mod uploader;

use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Load or create config
    let mut config = Config::load_or_create()?;

    match cli.command {
        Commands::Serve(args) => {
            cli::commands::serve::run(args, &config).await?;
        }
        Commands::Transform(args) => {
            cli::commands::transform::run(args, &config).await?;
        }
        Commands::Config(args) => {
            cli::commands::config::run(args, &mut config)?;
        }
    }

    Ok(())
}
