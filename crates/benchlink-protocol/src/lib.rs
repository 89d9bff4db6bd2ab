//! Wire protocol for benchlink.
//!
//! This crate defines the "language" the bench controller and the
//! compressor node speak:
//!
//! - **Types** ([`Message`], [`Command`], [`Info`], [`CompressorStatus`]):
//!   the values that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those values are
//!   converted to and from a line of JSON.
//! - **Framing** ([`LineBuffer`]): how a TCP byte stream is cut into lines.
//! - **Errors** ([`ProtocolError`]): what can go wrong along the way.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about sockets or Wi-Fi. It turns bytes
//! into messages and back:
//!
//! ```text
//! TCP bytes → LineBuffer (lines) → Codec (Message) → status mirror / channels
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod framing;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use framing::{DEFAULT_MAX_LINE_LEN, LineBuffer};
pub use types::{
    Command, CommandType, CompressorStatus, Info, InfoType, Message,
};
