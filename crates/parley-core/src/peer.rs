//! Connection handles.
//!
//! A [`Peer`] is the registry's view of one accepted connection: its id, its
//! remote address, the sending side of its outbound queue, and a close flag.
//! Handles are cheap to clone and all clones refer to the same connection.
//!
//! The receiving side of the queue ([`Outbound`]) belongs to the task that
//! owns the socket. That task writes queued frames in order and watches
//! [`Peer::closed`] so that a close requested elsewhere ends the session.

use std::{
    fmt,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use bytes::Bytes;
use tokio::sync::{
    Notify,
    mpsc::{self, error::TrySendError},
};

use crate::error::DeliveryError;

/// Receiving side of a peer's outbound queue.
pub type Outbound = mpsc::Receiver<Bytes>;

/// Process-unique connection identifier.
///
/// Ids are assigned in accept order, so ordering by id is ordering by age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to one connected participant.
#[derive(Clone)]
pub struct Peer {
    inner: Arc<PeerInner>,
}

struct PeerInner {
    id: ConnectionId,
    addr: SocketAddr,
    outbound: mpsc::Sender<Bytes>,
    closed: AtomicBool,
    close_signal: Notify,
}

impl Peer {
    /// Create a handle and its outbound queue.
    ///
    /// `queue_depth` bounds how many frames may wait for the socket writer;
    /// zero is treated as one.
    pub fn new(id: ConnectionId, addr: SocketAddr, queue_depth: usize) -> (Self, Outbound) {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        let inner = PeerInner {
            id,
            addr,
            outbound: tx,
            closed: AtomicBool::new(false),
            close_signal: Notify::new(),
        };
        (Self { inner: Arc::new(inner) }, rx)
    }

    /// Connection id.
    pub fn id(&self) -> ConnectionId {
        self.inner.id
    }

    /// Remote address, for logging.
    pub fn addr(&self) -> SocketAddr {
        self.inner.addr
    }

    /// Queue a frame for this peer without waiting.
    ///
    /// Fails if the peer is closed, its session has gone away, or its queue
    /// is full.
    pub fn deliver(&self, message: Bytes) -> Result<(), DeliveryError> {
        if self.is_closed() {
            return Err(DeliveryError::Closed);
        }

        self.inner.outbound.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::QueueFull,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Mark the connection closed and wake its session.
    ///
    /// Returns `true` for the call that actually closed it.
    pub fn close(&self) -> bool {
        let first = !self.inner.closed.swap(true, Ordering::AcqRel);
        if first {
            self.inner.close_signal.notify_waiters();
            // store a permit for a session that is not currently waiting
            self.inner.close_signal.notify_one();
        }
        first
    }

    /// Whether [`Self::close`] has been called or the session has exited.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire) || self.inner.outbound.is_closed()
    }

    /// Resolves once the connection is closed.
    pub async fn closed(&self) {
        while !self.inner.closed.load(Ordering::Acquire) {
            self.inner.close_signal.notified().await;
        }
    }
}

impl PartialEq for Peer {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Peer {}

impl fmt::Debug for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peer")
            .field("id", &self.inner.id)
            .field("addr", &self.inner.addr)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[test]
    fn deliver_enqueues_in_order() {
        let (peer, mut rx) = Peer::new(ConnectionId::new(1), addr(), 4);
        peer.deliver(Bytes::from_static(b"one")).unwrap();
        peer.deliver(Bytes::from_static(b"two")).unwrap();

        assert_eq!(rx.try_recv().unwrap(), Bytes::from_static(b"one"));
        assert_eq!(rx.try_recv().unwrap(), Bytes::from_static(b"two"));
    }

    #[test]
    fn deliver_reports_full_queue() {
        let (peer, _rx) = Peer::new(ConnectionId::new(1), addr(), 1);
        peer.deliver(Bytes::from_static(b"one")).unwrap();
        assert_eq!(peer.deliver(Bytes::from_static(b"two")), Err(DeliveryError::QueueFull));
    }

    #[test]
    fn deliver_fails_once_session_is_gone() {
        let (peer, rx) = Peer::new(ConnectionId::new(1), addr(), 4);
        drop(rx);
        assert!(peer.is_closed());
        assert_eq!(peer.deliver(Bytes::from_static(b"hi")), Err(DeliveryError::Closed));
    }

    #[test]
    fn close_is_reported_once() {
        let (peer, _rx) = Peer::new(ConnectionId::new(1), addr(), 4);
        let clone = peer.clone();
        assert!(peer.close());
        assert!(!clone.close());
        assert!(clone.is_closed());
        assert_eq!(clone.deliver(Bytes::from_static(b"hi")), Err(DeliveryError::Closed));
    }

    #[test]
    fn zero_depth_queue_still_accepts_one_frame() {
        let (peer, _rx) = Peer::new(ConnectionId::new(1), addr(), 0);
        assert!(peer.deliver(Bytes::from_static(b"hi")).is_ok());
    }

    #[tokio::test]
    async fn closed_resolves_after_close_from_another_task() {
        let (peer, _rx) = Peer::new(ConnectionId::new(7), addr(), 4);
        let remote = peer.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            remote.close();
        });

        tokio::time::timeout(Duration::from_secs(5), peer.closed()).await.unwrap();
    }

    #[tokio::test]
    async fn closed_resolves_immediately_when_already_closed() {
        let (peer, _rx) = Peer::new(ConnectionId::new(7), addr(), 4);
        peer.close();
        tokio::time::timeout(Duration::from_secs(5), peer.closed()).await.unwrap();
    }

    #[test]
    fn display_uses_hash_prefix() {
        assert_eq!(ConnectionId::new(42).to_string(), "#42");
    }
}
