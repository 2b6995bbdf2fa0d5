//! Per-connection session handler.
//!
//! Each accepted connection runs one [`Session`] task. The task is the only
//! reader of its socket and the only writer to it:
//!
//! - reads are decoded as UTF-8 frames, checked for a pseudonym
//!   announcement, and broadcast to every other connection;
//! - frames other sessions queued for this peer are written in order, each
//!   under [`SessionConfig::write_timeout`];
//! - a close requested elsewhere (the broadcaster pruning this peer) ends
//!   the loop.
//!
//! Any read error, empty read, undecodable frame, or failed write ends the
//! session. It then removes itself from the registry and shuts the socket.
//! Nothing is sent to the departing client.

use std::{io, time::Duration};

use bytes::Bytes;
use parley_core::{Broadcaster, Outbound, Peer};
use parley_proto::{Frame, ProtocolError};
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    time::timeout,
};
use tracing::{debug, info, trace};

use crate::config::ServerConfig;

/// How long a departing session waits for its socket shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Per-session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bytes requested per read.
    pub frame_size: usize,
    /// Upper bound on one socket write.
    pub write_timeout: Duration,
}

impl From<&ServerConfig> for SessionConfig {
    fn from(config: &ServerConfig) -> Self {
        Self { frame_size: config.frame_size.max(1), write_timeout: config.write_timeout }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

/// Why a session ended.
#[derive(Debug, Error)]
enum Disconnect {
    #[error("peer closed the connection")]
    PeerClosed,
    #[error("read failed: {0}")]
    ReadFailed(io::Error),
    #[error("undecodable frame: {0}")]
    Malformed(ProtocolError),
    #[error("write failed: {0}")]
    WriteFailed(io::Error),
    #[error("write timed out")]
    WriteTimedOut,
    #[error("closed by relay")]
    Evicted,
}

/// One connected client.
#[derive(Debug)]
pub struct Session {
    peer: Peer,
    broadcaster: Broadcaster,
    config: SessionConfig,
}

impl Session {
    /// Create a session for a peer that is already in the registry.
    pub fn new(peer: Peer, broadcaster: Broadcaster, config: SessionConfig) -> Self {
        Self { peer, broadcaster, config }
    }

    /// Drive the connection until it ends.
    ///
    /// `outbound` is the receiving side of the queue created with the peer.
    pub async fn run<S>(self, stream: S, mut outbound: Outbound)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut reader, mut writer) = tokio::io::split(stream);
        let mut buf = vec![0u8; self.config.frame_size];

        let reason = loop {
            tokio::select! {
                biased;

                () = self.peer.closed() => break Disconnect::Evicted,
                read = reader.read(&mut buf) => match read {
                    Ok(0) => break Disconnect::PeerClosed,
                    Ok(n) => match Frame::decode_with_limit(&buf[..n], self.config.frame_size) {
                        Ok(frame) => self.handle_frame(&frame),
                        Err(error) => break Disconnect::Malformed(error),
                    },
                    Err(error) => break Disconnect::ReadFailed(error),
                },
                Some(message) = outbound.recv() => {
                    // pruned peers are out of the registry; drop whatever is left queued
                    if self.peer.is_closed() {
                        break Disconnect::Evicted;
                    }
                    if let Err(reason) = self.write(&mut writer, &message).await {
                        break reason;
                    }
                },
            }
        };

        self.finish(&reason, &mut writer).await;
    }

    fn handle_frame(&self, frame: &Frame) {
        let id = self.peer.id();

        if let Some(control) = frame.control() {
            match control.pseudonym() {
                Some(name) => {
                    let registry = self.broadcaster.registry();
                    if registry.register_name(id, name) {
                        info!(conn = %id, name, known = ?registry.names(), "pseudonym registered");
                    } else {
                        debug!(conn = %id, name, "pseudonym already known");
                    }
                },
                None => debug!(conn = %id, "pseudonym frame without a name"),
            }
        }

        // control frames are relayed like any other chat text
        let report = self.broadcaster.broadcast(frame.payload(), id);
        trace!(
            conn = %id,
            len = frame.len(),
            delivered = report.delivered,
            pruned = report.pruned.len(),
            "relayed frame"
        );
    }

    async fn write<W>(&self, writer: &mut W, message: &Bytes) -> Result<(), Disconnect>
    where
        W: AsyncWrite + Unpin,
    {
        match timeout(self.config.write_timeout, writer.write_all(message)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(Disconnect::WriteFailed(error)),
            Err(_) => Err(Disconnect::WriteTimedOut),
        }
    }

    async fn finish<W>(&self, reason: &Disconnect, writer: &mut W)
    where
        W: AsyncWrite + Unpin,
    {
        let id = self.peer.id();
        let registry = self.broadcaster.registry();
        let name = registry.display_name(id);

        registry.remove(id);
        self.peer.close();
        if let Ok(Err(error)) = timeout(SHUTDOWN_GRACE, writer.shutdown()).await {
            trace!(conn = %id, %error, "socket shutdown failed");
        }

        info!(
            conn = %id,
            peer = %self.peer.addr(),
            name = name.as_deref().unwrap_or("-"),
            %reason,
            "client disconnected"
        );
    }
}
