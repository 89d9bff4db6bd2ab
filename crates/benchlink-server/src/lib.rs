//! Single-peer TCP message server for benchlink.
//!
//! [`MessageServer`] listens on a fixed port (3000 by default) and holds at
//! most one connection to the compressor node. While a peer is connected
//! the session:
//!
//! - decodes each incoming line and applies `Info` messages to the shared
//!   status mirror, forwarding them to the info channel;
//! - drains the command channel onto the socket;
//! - sends a `GET_STATUS` as soon as the peer arrives, so the mirror is
//!   populated without waiting for the next change.
//!
//! A listener that cannot be created raises `SOCKET_SERVER_FAILED` for the
//! network manager. A peer leaving is routine and raises nothing.

mod config;
mod error;
mod server;
mod session;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::MessageServer;
pub use session::SessionEnd;

use std::fmt;

/// Identifier for one accepted peer connection, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
        assert_eq!(id.into_inner(), 7);
    }

    #[test]
    fn test_connection_ids_order_by_value() {
        assert!(ConnectionId::new(1) < ConnectionId::new(2));
    }
}
