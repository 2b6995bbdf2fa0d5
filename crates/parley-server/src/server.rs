//! Accept loop.

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use parley_core::{Broadcaster, ConnectionId, Peer, Registry, Transport};
use tracing::{info, warn};

use crate::{
    config::ServerConfig,
    session::{Session, SessionConfig},
};

/// Pause after a failed accept so a persistent error (fd exhaustion) does
/// not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// The relay: accepts connections and spawns a [`Session`] for each.
#[derive(Debug)]
pub struct Server<T> {
    transport: T,
    config: ServerConfig,
    broadcaster: Broadcaster,
}

impl<T: Transport> Server<T> {
    /// Create a relay with a fresh registry sized by `config`.
    pub fn new(transport: T, config: ServerConfig) -> Self {
        let registry = Arc::new(Registry::with_limit(config.max_connections));
        Self::with_registry(transport, config, registry)
    }

    /// Create a relay over an existing registry.
    ///
    /// The registry's own limit applies; `config.max_connections` is ignored.
    pub fn with_registry(transport: T, config: ServerConfig, registry: Arc<Registry>) -> Self {
        Self { transport, config, broadcaster: Broadcaster::new(registry) }
    }

    /// Shared handle to the relay's registry.
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(self.broadcaster.registry())
    }

    /// Address the relay is listening on.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Accept connections forever.
    ///
    /// Never returns; the process exiting is the only shutdown.
    pub async fn run(self) {
        let mut next_id: u64 = 0;

        loop {
            let (stream, addr) = match self.transport.accept().await {
                Ok(accepted) => accepted,
                Err(error) => {
                    warn!(%error, "accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                },
            };

            next_id += 1;
            self.admit(ConnectionId::new(next_id), stream, addr);
        }
    }

    fn admit(&self, id: ConnectionId, stream: T::Stream, addr: SocketAddr) {
        let (peer, outbound) = Peer::new(id, addr, self.config.outbound_queue);

        if let Err(error) = self.broadcaster.registry().add(peer.clone()) {
            // dropping the stream closes the connection
            warn!(conn = %id, peer = %addr, %error, "rejecting connection");
            return;
        }
        info!(conn = %id, peer = %addr, "client connected");

        let session = Session::new(peer, self.broadcaster.clone(), SessionConfig::from(&self.config));
        tokio::spawn(session.run(stream, outbound));
    }
}
