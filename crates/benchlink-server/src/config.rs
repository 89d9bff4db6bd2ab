//! Message server configuration.

use std::time::Duration;

use benchlink_protocol::DEFAULT_MAX_LINE_LEN;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for [`MessageServer`](crate::MessageServer).
///
/// Every field has a default, so a config document only needs to name the
/// values it changes:
///
/// ```json
/// { "bind_addr": "0.0.0.0:3000", "poll_interval_ms": 50 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to. Must be `ip:port`.
    pub bind_addr: String,
    /// Upper bound on how long a session waits between passes. Default: 100 ms.
    pub poll_interval_ms: u64,
    /// Bytes requested per socket read.
    pub read_chunk: usize,
    /// Longest accepted line before the framing layer discards it.
    pub max_line_len: usize,
    /// Pause after a failed accept. Default: 1 s.
    pub accept_retry_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{}", Self::DEFAULT_PORT),
            poll_interval_ms: 100,
            read_chunk: 512,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            accept_retry_ms: 1_000,
        }
    }
}

impl ServerConfig {
    /// Port the compressor node connects to.
    pub const DEFAULT_PORT: u16 = 3000;

    /// Shortest line limit that still fits a full `STATUS_UPDATE`.
    pub const MIN_LINE_LEN: usize = 512;

    pub fn with_bind_addr(addr: impl Into<String>) -> Self {
        Self {
            bind_addr: addr.into(),
            ..Default::default()
        }
    }

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Rules:
    /// - `poll_interval_ms` and `accept_retry_ms` at least 1 ms (no spin).
    /// - `read_chunk` at least 1 byte.
    /// - `max_line_len` at least [`Self::MIN_LINE_LEN`].
    pub fn validated(mut self) -> Self {
        if self.poll_interval_ms == 0 {
            warn!("poll_interval_ms is 0, using 1 ms");
            self.poll_interval_ms = 1;
        }
        if self.accept_retry_ms == 0 {
            warn!("accept_retry_ms is 0, using 1 ms");
            self.accept_retry_ms = 1;
        }
        if self.read_chunk == 0 {
            let fallback = Self::default().read_chunk;
            warn!(fallback, "read_chunk is 0, using default");
            self.read_chunk = fallback;
        }
        if self.max_line_len < Self::MIN_LINE_LEN {
            warn!(
                max_line_len = self.max_line_len,
                min = Self::MIN_LINE_LEN,
                "max_line_len too small, clamping"
            );
            self.max_line_len = Self::MIN_LINE_LEN;
        }
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn accept_retry(&self) -> Duration {
        Duration::from_millis(self.accept_retry_ms)
    }
}
