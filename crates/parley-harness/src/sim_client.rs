//! Chat client for simulations.

use std::{io, time::Duration};

use parley_proto::control;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use turmoil::net::TcpStream;

use crate::sim_server::{RELAY_HOST, RELAY_PORT};

/// A raw text client connected to the simulated relay.
pub struct SimClient {
    stream: TcpStream,
}

impl SimClient {
    /// Connect to the relay host.
    pub async fn connect() -> io::Result<Self> {
        let addr = format!("{RELAY_HOST}:{RELAY_PORT}");
        let stream = TcpStream::connect(addr.as_str()).await?;
        Ok(Self { stream })
    }

    /// Send one chat frame.
    pub async fn send(&mut self, text: &str) -> io::Result<()> {
        self.stream.write_all(text.as_bytes()).await
    }

    /// Announce a display name.
    pub async fn announce(&mut self, name: &str) -> io::Result<()> {
        self.send(&control::pseudonym_frame(name)).await
    }

    /// Receive the next chunk of text.
    ///
    /// Returns `None` once the relay has closed the connection.
    pub async fn recv(&mut self) -> io::Result<Option<String>> {
        let mut buf = [0u8; 2048];
        let n = self.stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        String::from_utf8(buf[..n].to_vec())
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// [`Self::recv`] bounded by virtual time.
    ///
    /// Times out with [`io::ErrorKind::TimedOut`].
    pub async fn recv_within(&mut self, limit: Duration) -> io::Result<Option<String>> {
        tokio::time::timeout(limit, self.recv())
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "nothing received"))?
    }

    /// Whether nothing arrives within `limit`.
    pub async fn is_silent_for(&mut self, limit: Duration) -> bool {
        tokio::time::timeout(limit, self.recv()).await.is_err()
    }
}
