use anyhow::Result;
use clap::Args;
use std::sync::Arc;

use crate::api::OpenAiClient;
use crate::config::Config;
use crate::core::Transformer;
use crate::server;

#[derive(Args)]
pub struct ServeArgs {
    /// Bind address (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory with the frontend assets (overrides config)
    #[arg(long)]
    pub static_dir: Option<String>,
}

pub async fn run(args: ServeArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(static_dir) = args.static_dir {
        config.server.static_dir = static_dir;
    }

    // Fail fast: refuse to start without a credential rather than letting
    // every transform request 500 later.
    let client = OpenAiClient::from_config(&config)?;
    let transformer = Transformer::new(Arc::new(client));

    server::serve(&config, transformer).await
}
