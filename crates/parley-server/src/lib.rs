//! Parley relay server
//!
//! Accepts TCP connections and relays every frame received from one client
//! to all the others. The registry and broadcast rules live in
//! [`parley_core`]; this crate owns the sockets.
//!
//! ```text
//! Server::run ──accept──> Registry::add ──spawn──> Session::run
//!                                                    │ read frame
//!                                                    ├─ pseudo$name -> Registry::register_name
//!                                                    └─ Broadcaster::broadcast
//! ```
//!
//! # Components
//!
//! - [`TcpTransport`]: Listener with address reuse enabled
//! - [`Server`]: Accept loop, one spawned [`Session`] per connection
//! - [`Session`]: Per-connection read loop and socket writer
//! - [`ServerConfig`] / [`Cli`]: Configuration and command line
//! - [`ServerError`]: Startup errors

mod config;
mod error;
mod listener;
mod server;
mod session;

pub use config::{Cli, DEFAULT_PORT, ServerConfig};
pub use error::ServerError;
pub use listener::TcpTransport;
pub use server::Server;
pub use session::{Session, SessionConfig};
