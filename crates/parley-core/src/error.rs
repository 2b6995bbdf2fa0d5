//! Registry and delivery errors.

use thiserror::Error;

use crate::peer::ConnectionId;

/// Errors from [`crate::Registry`] mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The configured connection limit is reached.
    #[error("connection limit reached ({limit})")]
    Full {
        /// The configured limit.
        limit: usize,
    },
}

/// Errors from delivering a frame to a single peer.
///
/// Any delivery error is terminal for that peer: the caller closes it and
/// removes it from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The peer was closed or its session task has exited.
    #[error("connection closed")]
    Closed,

    /// The peer's outbound queue is full; it is not keeping up.
    #[error("outbound queue full")]
    QueueFull,

    /// No connection with this id is registered.
    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),
}
