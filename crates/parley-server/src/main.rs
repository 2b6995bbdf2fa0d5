//! `parley-server` binary.

use clap::Parser;
use parley_core::resolver;
use parley_server::{Cli, Server, ServerConfig, ServerError, TcpTransport};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let config = ServerConfig::from(cli);
    let transport = TcpTransport::bind(config.bind_addr, config.backlog)?;
    let server = Server::new(transport, config);

    info!(
        addr = %server.local_addr()?,
        outward = %resolver::outward_address(),
        "waiting for connections"
    );

    server.run().await;
    Ok(())
}

fn init_tracing(fallback: &str) -> Result<(), ServerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback).map_err(|e| ServerError::LogFilter {
            directive: fallback.to_owned(),
            reason: e.to_string(),
        })?,
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
    Ok(())
}
