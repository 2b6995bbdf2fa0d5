//! Broadcast dispatch.
//!
//! [`Broadcaster::broadcast`] takes a registry snapshot and queues the frame
//! on every peer except the sender. Queuing never blocks, so a slow peer only
//! costs itself: once its queue fills, the next delivery fails and the peer
//! is closed and pruned.
//!
//! Pruning races with the peer's own session noticing the same disconnect.
//! Both sides call [`Registry::remove`], which tolerates the entry already
//! being gone.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::{
    error::DeliveryError,
    peer::{ConnectionId, Peer},
    registry::Registry,
};

/// Outcome of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Peers the frame was queued on.
    pub delivered: usize,
    /// Peers pruned because delivery failed.
    pub pruned: Vec<ConnectionId>,
}

/// Fans frames out to the connections in a [`Registry`].
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<Registry>,
}

impl Broadcaster {
    /// Create a broadcaster over `registry`.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// The registry this broadcaster reads.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Queue `message` on every live connection except `sender`.
    pub fn broadcast(&self, message: &Bytes, sender: ConnectionId) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for peer in self.registry.snapshot() {
            if peer.id() == sender {
                continue;
            }
            match peer.deliver(message.clone()) {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    self.prune(&peer, &error);
                    report.pruned.push(peer.id());
                },
            }
        }

        report
    }

    /// Queue `message` on a single connection.
    ///
    /// A failed delivery prunes the target exactly as a broadcast would.
    pub fn send_to(&self, target: ConnectionId, message: Bytes) -> Result<(), DeliveryError> {
        let peer = self.registry.get(target).ok_or(DeliveryError::UnknownConnection(target))?;
        peer.deliver(message).inspect_err(|error| self.prune(&peer, error))
    }

    fn prune(&self, peer: &Peer, error: &DeliveryError) {
        peer.close();
        if self.registry.remove(peer.id()).is_some() {
            debug!(conn = %peer.id(), peer = %peer.addr(), %error, "pruned unreachable peer");
        }
    }
}
