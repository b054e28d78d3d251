//! Local address probe.
//!
//! Connecting a UDP socket makes the OS pick the outgoing interface without
//! sending anything. The socket's local address is then the LAN address.

use serde::{Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Result of the LAN address probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalAddress {
    /// The interface address routing would use.
    Resolved(IpAddr),
    /// No interface resolved in time.
    Unknown,
}

impl LocalAddress {
    /// The address, if one resolved.
    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Self::Resolved(ip) => Some(*ip),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for LocalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(ip) => write!(f, "{}", ip),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for LocalAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Find the local address used to reach `target`.
///
/// Never fails. Anything short of a usable address yields
/// [`LocalAddress::Unknown`].
pub async fn probe_local_address(target: SocketAddr, limit: Duration) -> LocalAddress {
    match timeout(limit, route_source(target)).await {
        Ok(Ok(ip)) if !ip.is_unspecified() => {
            debug!(%ip, "Resolved local address");
            LocalAddress::Resolved(ip)
        }
        Ok(Ok(_)) => {
            warn!(%target, "Probe resolved to an unspecified address");
            LocalAddress::Unknown
        }
        Ok(Err(e)) => {
            warn!(%target, ?e, "LAN probe failed");
            LocalAddress::Unknown
        }
        Err(_) => {
            warn!(%target, timeout_ms = limit.as_millis() as u64, "LAN probe timed out");
            LocalAddress::Unknown
        }
    }
}

async fn route_source(target: SocketAddr) -> std::io::Result<IpAddr> {
    let bind: SocketAddr = match target {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(bind).await?;
    socket.connect(target).await?;
    Ok(socket.local_addr()?.ip())
}
