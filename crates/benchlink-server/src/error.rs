use std::net::AddrParseError;

/// Errors that can occur in the message server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The configured bind address is not a socket address.
    #[error("invalid bind address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    /// Creating or binding the listening socket failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Putting the socket into listening mode failed.
    #[error("listen failed: {0}")]
    Listen(#[source] std::io::Error),

    /// Accepting a peer failed. Retried by the accept loop.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// Writing to the peer failed; the connection is dropped.
    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),

    /// Reading from the peer failed; the connection is dropped.
    #[error("receive failed: {0}")]
    Receive(#[source] std::io::Error),
}
