//! TCP listener.

use std::{io, net::SocketAddr};

use async_trait::async_trait;
use parley_core::Transport;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::debug;

use crate::error::ServerError;

/// Production transport: a tokio TCP listener.
#[derive(Debug)]
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Bind and listen on `addr` with `SO_REUSEADDR` set, so a restarted
    /// relay can rebind while old connections sit in `TIME_WAIT`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(addr: SocketAddr, backlog: u32) -> Result<Self, ServerError> {
        let bind_error = |source| ServerError::Bind { addr, source };

        let socket = if addr.is_ipv4() { TcpSocket::new_v4() } else { TcpSocket::new_v6() };
        let socket = socket.map_err(bind_error)?;
        socket.set_reuseaddr(true).map_err(bind_error)?;
        socket.bind(addr).map_err(bind_error)?;
        let listener = socket.listen(backlog).map_err(bind_error)?;

        Ok(Self { listener })
    }
}

#[async_trait]
impl Transport for TcpTransport {
    type Stream = TcpStream;

    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        let (stream, addr) = self.listener.accept().await?;
        if let Err(error) = stream.set_nodelay(true) {
            debug!(peer = %addr, %error, "could not disable nagle");
        }
        Ok((stream, addr))
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
