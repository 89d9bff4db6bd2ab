//! Error types for the shared-state layer.

/// Errors raised by the shared channels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// The bounded queue had no room; the value was dropped.
    #[error("channel '{channel}' is full")]
    ChannelFull { channel: &'static str },
}
