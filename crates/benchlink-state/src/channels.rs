//! Bounded command and info queues.
//!
//! Two fixed-capacity FIFOs decouple the socket from the rest of the
//! firmware:
//!
//! - the **command** channel carries [`Command`]s produced locally (menu,
//!   buttons) out to the compressor;
//! - the **info** channel carries decoded [`Info`] events in from the
//!   compressor to whoever wants to react to them.
//!
//! Both are `embassy_sync` channels: statically sized, no allocation, and
//! `try_send` never waits. A producer that finds the queue full gets its
//! value back as an error and moves on.

use std::sync::atomic::{AtomicU32, Ordering};

use benchlink_protocol::{Command, Info};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use tracing::{debug, warn};

use crate::StateError;

/// Queue depth for both directions.
pub const COMMAND_QUEUE_DEPTH: usize = 5;
pub const INFO_QUEUE_DEPTH: usize = 5;

/// Outbound commands, drained by the active session.
pub type CommandChannel = MessageChannel<Command, COMMAND_QUEUE_DEPTH>;

/// Inbound events, filled by the active session.
pub type InfoChannel = MessageChannel<Info, INFO_QUEUE_DEPTH>;

/// A named, bounded, multi-producer multi-consumer FIFO.
pub struct MessageChannel<T, const N: usize> {
    name: &'static str,
    inner: Channel<CriticalSectionRawMutex, T, N>,
    dropped: AtomicU32,
}

impl<T, const N: usize> MessageChannel<T, N> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Enqueues without waiting.
    ///
    /// # Errors
    /// Returns [`StateError::ChannelFull`] when the queue is at capacity.
    /// The value is dropped and the queued ones are left untouched.
    pub fn try_send(&self, value: T) -> Result<(), StateError> {
        match self.inner.try_send(value) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(StateError::ChannelFull { channel: self.name })
            }
        }
    }

    /// Takes the oldest value if there is one.
    pub fn try_recv(&self) -> Option<T> {
        self.inner.try_receive().ok()
    }

    /// Waits for the next value.
    pub async fn recv(&self) -> T {
        self.inner.receive().await
    }

    /// Discards everything queued and returns how many values were dropped.
    pub fn flush(&self) -> usize {
        let mut flushed = 0;
        while self.inner.try_receive().is_ok() {
            flushed += 1;
        }
        if flushed > 0 {
            debug!(channel = self.name, flushed, "flushed stale entries");
        }
        flushed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Total values rejected because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T, const N: usize> std::fmt::Debug for MessageChannel<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageChannel")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("capacity", &N)
            .field("dropped", &self.dropped())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Command helpers
// ---------------------------------------------------------------------------

impl CommandChannel {
    /// Enqueues `command`, logging the outcome.
    pub fn send_command(&self, command: Command) -> Result<(), StateError> {
        let result = self.try_send(command);
        match &result {
            Ok(()) => debug!(command = %command.command_type(), "command queued"),
            Err(e) => warn!(command = %command.command_type(), error = %e, "command dropped"),
        }
        result
    }

    pub fn send_on(&self) -> Result<(), StateError> {
        self.send_command(Command::On)
    }

    pub fn send_off(&self) -> Result<(), StateError> {
        self.send_command(Command::Off)
    }

    pub fn send_off_release(&self) -> Result<(), StateError> {
        self.send_command(Command::OffRelease)
    }

    /// Asks the compressor for a full `STATUS_UPDATE`.
    pub fn request_status(&self) -> Result<(), StateError> {
        self.send_command(Command::GetStatus)
    }

    pub fn set_compression_timeout(&self, minutes: u32) -> Result<(), StateError> {
        self.send_command(Command::SetCompressionTimeout { timeout: minutes })
    }

    pub fn set_release_timeout(&self, minutes: u32) -> Result<(), StateError> {
        self.send_command(Command::SetReleaseTimeout { timeout: minutes })
    }

    pub fn set_motor_timeout(&self, minutes: u32) -> Result<(), StateError> {
        self.send_command(Command::SetMotorTimeout { timeout: minutes })
    }
}

// =========================================================================
// Tests
// =========================================================================
