//! Transport abstraction for the relay.
//!
//! The acceptor only needs "wait for the next connection" and a byte stream
//! per connection. Production uses tokio TCP, tests use turmoil's simulated
//! TCP, and the session logic is identical for both.

use std::{io, net::SocketAddr};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// A bound listener that yields byte streams.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Bidirectional stream for one accepted connection.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Accept the next incoming connection.
    ///
    /// Blocks until a peer connects and returns its stream and remote
    /// address. Errors are per-connection; the listener stays usable.
    async fn accept(&self) -> io::Result<(Self::Stream, SocketAddr)>;

    /// The address the listener is bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}
