//! Server error types.

use std::{io, net::SocketAddr};

use thiserror::Error;

/// Fatal errors raised before the accept loop starts.
///
/// Once the relay is accepting, connection-level failures end only that
/// connection and are logged, never returned.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be created, bound, or put in listen
    /// mode (port already taken, address not local, ...).
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        /// Requested listen address.
        addr: SocketAddr,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The log filter directive could not be parsed.
    #[error("invalid log filter {directive:?}: {reason}")]
    LogFilter {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// Other I/O failure during startup.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
