//! Error types for the protocol layer.
//!
//! Each benchlink crate defines its own error enum. A `ProtocolError` always
//! means the bytes themselves were the problem: they could not be framed,
//! encoded, or decoded. Networking failures live in `ServerError`.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into wire text).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed.
    ///
    /// Common causes: malformed JSON, a missing `messageType`, an unknown
    /// `commandType`/`infoType`, or a field with the wrong JSON type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A peer sent more than `max` bytes without a newline. The partial
    /// line has been discarded.
    #[error("line too long: {len} bytes without a terminator (max {max})")]
    LineTooLong { len: usize, max: usize },

    /// The message parsed but violates a protocol rule, such as a command
    /// arriving from the compressor side.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
