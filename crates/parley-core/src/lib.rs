//! Parley core logic
//!
//! The shared state of the relay and the rules for moving a message from one
//! participant to all the others. Nothing in this crate owns a socket: the
//! server (or a simulation harness) drives I/O and calls in here.
//!
//! # Architecture
//!
//! ```text
//! session task ──frame──> Broadcaster ──snapshot──> Registry
//!      ▲                       │
//!      │ outbound queue        │ deliver (non-blocking)
//!      └───────────────────────┘
//! ```
//!
//! Every connection is represented by a [`Peer`] handle with a bounded
//! outbound queue. Delivery only enqueues; the task that owns the socket
//! performs the write. A peer whose queue is closed or full is pruned from
//! the registry by whichever party notices first.
//!
//! # Components
//!
//! - [`peer`]: Connection handles and ids
//! - [`registry`]: The shared connection and display name registry
//! - [`broadcast`]: Fan-out of one frame to every other connection
//! - [`transport`]: Transport abstraction (listener + streams)
//! - [`token`]: Reversible text token encoding
//! - [`resolver`]: Outward-facing address discovery
//! - [`error`]: Registry and delivery error types

pub mod broadcast;
pub mod error;
pub mod peer;
pub mod registry;
pub mod resolver;
pub mod token;
pub mod transport;

pub use broadcast::{BroadcastReport, Broadcaster};
pub use error::{DeliveryError, RegistryError};
pub use peer::{ConnectionId, Outbound, Peer};
pub use registry::Registry;
pub use transport::Transport;
