//! Simulated TCP transport.

use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
};

use async_trait::async_trait;
use parley_core::Transport;
use turmoil::net::{TcpListener, TcpStream};

/// [`Transport`] over turmoil's simulated TCP.
pub struct SimTransport {
    listener: TcpListener,
}

impl SimTransport {
    /// Bind on all interfaces of the current simulated host.
    pub async fn bind(port: u16) -> io::Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }
}

#[async_trait]
impl Transport for SimTransport {
    type Stream = TcpStream;

    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        self.listener.accept().await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
