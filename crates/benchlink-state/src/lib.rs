//! Cross-task state shared by every benchlink component.
//!
//! The firmware has exactly four mutable structures that more than one task
//! touches, and they all live in [`SharedState`]:
//!
//! - [`StatusMirror`]: the last known compressor status;
//! - the [`CommandChannel`] and [`InfoChannel`] queues;
//! - the [`SignalSet`] the network manager sleeps on;
//! - the `peer_connected` flag the status indicator reads.
//!
//! One `SharedState` is created at boot and handed out as an
//! `Arc<SharedState>` to the server, the network manager, and any
//! UI collaborators.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod channels;
mod error;
mod mirror;
mod signals;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use channels::{
    COMMAND_QUEUE_DEPTH, CommandChannel, INFO_QUEUE_DEPTH, InfoChannel,
    MessageChannel,
};
pub use error::StateError;
pub use mirror::{StatusMirror, apply_info};
pub use signals::{NetworkSignal, PendingSignals, SignalSet};

// The embassy channels lock through `critical-section`; on the host its
// `std` feature supplies the implementation.
use critical_section as _;

use std::sync::atomic::{AtomicBool, Ordering};

/// Everything the firmware's tasks share.
#[derive(Debug)]
pub struct SharedState {
    pub mirror: StatusMirror,
    pub commands: CommandChannel,
    pub infos: InfoChannel,
    pub signals: SignalSet,
    peer_connected: AtomicBool,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            mirror: StatusMirror::new(),
            commands: CommandChannel::new("commands"),
            infos: InfoChannel::new("infos"),
            signals: SignalSet::new(),
            peer_connected: AtomicBool::new(false),
        }
    }

    /// Whether a compressor is currently connected to the message server.
    pub fn peer_connected(&self) -> bool {
        self.peer_connected.load(Ordering::Acquire)
    }

    pub fn set_peer_connected(&self, connected: bool) {
        self.peer_connected.store(connected, Ordering::Release);
    }

    /// Raises a network signal. Shorthand for `self.signals.raise(..)`.
    pub fn raise(&self, signal: NetworkSignal) -> bool {
        self.signals.raise(signal)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
