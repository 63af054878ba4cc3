use clap::Parser;
use tracing_subscriber::EnvFilter;

use redis_kv::{
    config::{Cli, ServerConfig},
    server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::try_from(Cli::parse())?;

    server::run(config).await
}
