//! Newline framing for the TCP byte stream.
//!
//! TCP delivers bytes, not messages. One `read` may return half a JSON
//! object, or three objects and the start of a fourth. [`LineBuffer`]
//! sits between the socket and the codec: it accumulates bytes and hands
//! back each complete `\n`-terminated line exactly once, in order.

use tracing::debug;

use crate::ProtocolError;

/// Longest line we will buffer before giving up on it.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

/// Per-connection partial-line buffer.
///
/// ```text
/// push(b"{\"a\":1}\n{\"b")   → [Ok(b"{\"a\":1}")]      buffered: {"b
/// push(b"\":2}\r\n")         → [Ok(b"{\"b\":2}")]      buffered: (empty)
/// ```
///
/// A trailing `\r` is stripped and blank lines are skipped. If a peer
/// sends more than `max_len` bytes without a newline, the partial line is
/// dropped, a [`ProtocolError::LineTooLong`] is reported once, and
/// everything up to the next newline is ignored.
#[derive(Debug)]
pub struct LineBuffer {
    buf: Vec<u8>,
    max_len: usize,
    /// Set after an overflow until the next `\n` resynchronises us.
    discarding: bool,
}

impl LineBuffer {
    pub fn new(max_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_len,
            discarding: false,
        }
    }

    /// Appends `bytes` and returns every line completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<Vec<u8>, ProtocolError>> {
        let mut lines = Vec::new();
        let mut rest = bytes;

        while let Some(idx) = rest.iter().position(|&b| b == b'\n') {
            let segment = &rest[..idx];
            rest = &rest[idx + 1..];

            if self.discarding {
                debug!("line buffer resynchronised after oversized line");
                self.discarding = false;
                continue;
            }

            let len = self.buf.len() + segment.len();
            if len > self.max_len {
                self.buf.clear();
                lines.push(Err(self.too_long(len)));
                continue;
            }

            self.buf.extend_from_slice(segment);
            let mut line = std::mem::take(&mut self.buf);
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            lines.push(Ok(line));
        }

        if !rest.is_empty() && !self.discarding {
            let len = self.buf.len() + rest.len();
            if len > self.max_len {
                self.buf.clear();
                self.discarding = true;
                lines.push(Err(self.too_long(len)));
            } else {
                self.buf.extend_from_slice(rest);
            }
        }

        lines
    }

    /// Bytes held for the line currently being received.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Drops any partial line. Called when a new connection takes over.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }

    fn too_long(&self, len: usize) -> ProtocolError {
        ProtocolError::LineTooLong {
            len,
            max: self.max_len,
        }
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

// =========================================================================
// Tests
// =========================================================================
