//! Deterministic simulation harness for the Parley relay.
//!
//! Turmoil-backed implementations of the [`parley_core::Transport`] trait and
//! a small line-of-text client, so the production [`parley_server::Server`]
//! can be exercised under simulated networks with virtual time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod sim_client;
pub mod sim_server;
pub mod sim_transport;

pub use sim_client::SimClient;
pub use sim_server::{RELAY_HOST, RELAY_PORT, run_relay};
pub use sim_transport::SimTransport;
