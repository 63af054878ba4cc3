use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, sync::Mutex};
use tracing::info;

use crate::{
    config::ServerConfig, connection::handle_client_connection, key_value_store::KeyValueStore,
    state::State,
};

/// Binds the configured address and serves clients until the process exits.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.bind, config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.bind, config.port))?;

    serve(listener, config).await
}

/// Accepts connections on an already bound listener.
///
/// Every client gets its own task; the store and the blocking registry are
/// shared between all of them.
pub async fn serve(listener: TcpListener, config: ServerConfig) -> anyhow::Result<()> {
    let store = Arc::new(KeyValueStore::new());
    let state = Arc::new(Mutex::new(State::new()));
    let config = Arc::new(config);

    info!(
        address = %listener.local_addr()?,
        role = config.role.as_str(),
        "server listening"
    );

    loop {
        let (stream, client_address) = listener
            .accept()
            .await
            .context("failed to accept connection")?;
        info!(%client_address, "accepted connection");

        tokio::spawn(handle_client_connection(
            stream,
            client_address.to_string(),
            Arc::clone(&store),
            Arc::clone(&state),
            Arc::clone(&config),
        ));
    }
}
