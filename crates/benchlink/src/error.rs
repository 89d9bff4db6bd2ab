//! Unified error type for benchlink.

use benchlink_net::NetError;
use benchlink_protocol::ProtocolError;
use benchlink_server::ServerError;
use benchlink_state::StateError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BenchlinkError {
    /// Encoding, decoding or framing a message.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A full channel.
    #[error(transparent)]
    State(#[from] StateError),

    /// The message server (bad address, listener failure).
    #[error(transparent)]
    Server(#[from] ServerError),

    /// The radio or local services.
    #[error(transparent)]
    Net(#[from] NetError),

    /// A configuration document that does not parse.
    #[error("invalid config: {0}")]
    Config(#[source] serde_json::Error),

    /// Reading a configuration file.
    #[error("config file: {0}")]
    Io(#[from] std::io::Error),
}
