//! Connection registry.
//!
//! The registry is the only shared mutable state in the relay. It tracks the
//! live connections and the display names participants have announced.
//!
//! All operations take one mutex for the duration of a single operation and
//! never hold it across an `.await`. Iteration always goes through
//! [`Registry::snapshot`], an owned copy, so a broadcast never observes (or
//! causes) a half-applied mutation.
//!
//! ```text
//! acceptor ──add──────┐
//! session  ──remove───┤
//! session  ──names────┼──> Mutex<RegistryState>
//! broadcast ─snapshot─┤
//! broadcast ─remove───┘
//! ```

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::trace;

use crate::{
    error::RegistryError,
    peer::{ConnectionId, Peer},
};

/// Shared set of live connections and known display names.
#[derive(Debug, Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
    limit: Option<usize>,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Live connections, ordered by id (accept order).
    connections: BTreeMap<ConnectionId, Peer>,
    /// Every distinct name ever announced, in first-seen order.
    names: Vec<String>,
    /// Last name announced by each live connection.
    display_names: HashMap<ConnectionId, String>,
}

impl Registry {
    /// Create an unbounded registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that refuses new connections beyond `limit`.
    ///
    /// `None` means unbounded.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self { state: Mutex::default(), limit }
    }

    /// Configured connection limit.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // State stays consistent across a panic: every mutation is a single
        // map or vec operation.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a connection.
    ///
    /// Adding an id that is already present replaces nothing and succeeds.
    pub fn add(&self, peer: Peer) -> Result<(), RegistryError> {
        let mut state = self.lock();
        if state.connections.contains_key(&peer.id()) {
            return Ok(());
        }
        if let Some(limit) = self.limit.filter(|&limit| state.connections.len() >= limit) {
            return Err(RegistryError::Full { limit });
        }

        trace!(conn = %peer.id(), peer = %peer.addr(), "registered connection");
        state.connections.insert(peer.id(), peer);
        Ok(())
    }

    /// Remove a connection. Removing an absent id is a no-op.
    ///
    /// Returns the handle if this call removed it.
    pub fn remove(&self, id: ConnectionId) -> Option<Peer> {
        let mut state = self.lock();
        state.display_names.remove(&id);
        state.connections.remove(&id)
    }

    /// Record a display name announced by `id`.
    ///
    /// The name is appended to [`Self::names`] only if not already known;
    /// several connections may announce the same name. Returns `true` when
    /// the name was new.
    pub fn register_name(&self, id: ConnectionId, name: &str) -> bool {
        let mut state = self.lock();
        if state.connections.contains_key(&id) {
            state.display_names.insert(id, name.to_owned());
        }
        if state.names.iter().any(|known| known == name) {
            return false;
        }
        state.names.push(name.to_owned());
        true
    }

    /// Point-in-time copy of the live connections, ordered by id.
    pub fn snapshot(&self) -> Vec<Peer> {
        self.lock().connections.values().cloned().collect()
    }

    /// Look up a live connection.
    pub fn get(&self, id: ConnectionId) -> Option<Peer> {
        self.lock().connections.get(&id).cloned()
    }

    /// Whether `id` is live.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.lock().connections.contains_key(&id)
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.lock().connections.len()
    }

    /// Whether there are no live connections.
    pub fn is_empty(&self) -> bool {
        self.lock().connections.is_empty()
    }

    /// Every distinct display name announced so far, in first-seen order.
    pub fn names(&self) -> Vec<String> {
        self.lock().names.clone()
    }

    /// The last name announced by a live connection.
    pub fn display_name(&self, id: ConnectionId) -> Option<String> {
        self.lock().display_names.get(&id).cloned()
    }
}
