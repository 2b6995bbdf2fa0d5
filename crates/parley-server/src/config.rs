//! Server configuration and command line.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroUsize,
    time::Duration,
};

use clap::Parser;
use parley_proto::Frame;

/// Port the relay listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 5000;

/// Relay configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections. `None` is unbounded.
    pub max_connections: Option<usize>,
    /// Frames that may wait for one peer's socket before it is pruned.
    pub outbound_queue: usize,
    /// Bytes requested per read; one read is one frame.
    pub frame_size: usize,
    /// Upper bound on a single socket write.
    pub write_timeout: Duration,
    /// Listen backlog passed to the OS.
    pub backlog: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            max_connections: None,
            outbound_queue: 64,
            frame_size: Frame::MAX_SIZE,
            write_timeout: Duration::from_secs(5),
            backlog: 1024,
        }
    }
}

/// Command line for the `parley-server` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "parley-server", version, about = "Text chat relay: every message goes to every other client")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Refuse connections beyond this many (unbounded when omitted)
    #[arg(long)]
    pub max_connections: Option<NonZeroUsize>,

    /// Frames queued per client before it counts as unresponsive
    #[arg(long, default_value = "64")]
    pub outbound_queue: NonZeroUsize,

    /// Read size in bytes; each read is relayed as one frame
    #[arg(long, default_value = "1024")]
    pub frame_size: NonZeroUsize,

    /// Give up on a write to one client after this many milliseconds
    #[arg(long, default_value_t = 5000)]
    pub write_timeout_ms: u64,

    /// Listen backlog
    #[arg(long, default_value_t = 1024)]
    pub backlog: u32,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            bind_addr: SocketAddr::new(cli.host, cli.port),
            max_connections: cli.max_connections.map(NonZeroUsize::get),
            outbound_queue: cli.outbound_queue.get(),
            frame_size: cli.frame_size.get(),
            write_timeout: Duration::from_millis(cli.write_timeout_ms),
            backlog: cli.backlog,
        }
    }
}
