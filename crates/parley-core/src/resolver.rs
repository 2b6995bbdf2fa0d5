//! Outward-facing address discovery.
//!
//! "Connecting" a UDP socket sends nothing but makes the kernel pick the
//! source address it would route through. That address is the one other
//! hosts on the network can reach us on. Any failure falls back to loopback.
//!
//! Used for the operator-facing startup log only.

use std::{
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket},
};

use tracing::debug;

/// Destination used for route selection. It never receives a packet.
pub const PROBE_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(10, 254, 254, 254), 1));

/// Address returned when discovery fails.
pub const FALLBACK: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Best local IPv4 address, or `127.0.0.1`.
pub fn outward_ipv4() -> Ipv4Addr {
    resolve_via(PROBE_ADDR)
}

/// [`outward_ipv4`] as a dotted quad.
pub fn outward_address() -> String {
    outward_ipv4().to_string()
}

/// Discover the local address used to reach `probe`.
pub fn resolve_via(probe: SocketAddr) -> Ipv4Addr {
    match probe_local_ipv4(probe) {
        Ok(ip) => ip,
        Err(error) => {
            debug!(%probe, %error, "address probe failed, falling back to loopback");
            FALLBACK
        },
    }
}

fn probe_local_ipv4(probe: SocketAddr) -> io::Result<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(probe)?;

    match socket.local_addr()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => Ok(ip),
        other => Err(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no usable local address ({other})"),
        )),
    }
}
