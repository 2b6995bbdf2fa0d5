//! Relay host for simulations.

use std::{error::Error, sync::Arc};

use parley_core::Registry;
use parley_server::{Server, ServerConfig};
use tracing::debug;

use crate::sim_transport::SimTransport;

/// Host name the relay runs under in simulations.
pub const RELAY_HOST: &str = "relay";

/// Port the simulated relay listens on.
pub const RELAY_PORT: u16 = 5000;

/// Run the production relay on the current simulated host.
///
/// The caller keeps a clone of `registry` to inspect relay state from client
/// hosts. Never returns unless binding fails.
pub async fn run_relay(registry: Arc<Registry>, config: ServerConfig) -> Result<(), Box<dyn Error>> {
    let transport = SimTransport::bind(RELAY_PORT).await?;
    debug!(port = RELAY_PORT, "simulated relay listening");

    Server::with_registry(transport, config, registry).run().await;
    Ok(())
}
