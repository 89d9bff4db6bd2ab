//! The controller's local copy of the compressor's state.
//!
//! The compressor node is the source of truth. It streams [`Info`] events
//! and the active session feeds each one through [`apply_info`]. Everyone
//! else (menu, display, logging) reads a snapshot.

use benchlink_protocol::{CompressorStatus, Info};
use tokio::sync::watch;
use tracing::debug;

/// Applies one decoded [`Info`] to `status`.
///
/// Only the fields named by the event's type are touched; a
/// `PRESSURE_CHANGE` never alters a timer. Returns `true` when any field
/// actually changed value.
pub fn apply_info(status: &mut CompressorStatus, info: &Info) -> bool {
    let before = *status;

    match *info {
        Info::StatusUpdate(snapshot) => *status = snapshot,
        Info::PressureChange { pressure } => status.pressure = pressure,
        Info::TemperatureChange { temperature } => status.temperature = temperature,
        Info::PressureCountdownUpdated {
            compression_time_left,
        } => status.compression_time_left = compression_time_left,
        Info::ReleaseCountdownUpdate { release_time_left } => {
            status.release_time_left = release_time_left
        }
        Info::MotorCountdownUpdate { motor_time_left } => {
            status.motor_time_left = motor_time_left
        }
        Info::TurnedOn => status.compressor_on = true,
        Info::TurnedOff => status.compressor_on = false,
        Info::MotorStart => status.motor_running = true,
        Info::MotorStop => status.motor_running = false,
        Info::SupplyStart => status.airbrush_in_use = true,
        Info::SupplyStop => status.airbrush_in_use = false,
        Info::Releasing
        | Info::Released
        | Info::PressureCountdownEnd
        | Info::ReleaseCountdownEnd
        | Info::MotorCountdownEnd => {
            debug!(info = %info.info_type(), "observational event");
        }
    }

    *status != before
}

/// Concurrently readable [`CompressorStatus`].
///
/// Backed by a `tokio::sync::watch` channel: one writer (the active
/// session) and any number of readers, each of which either takes a
/// snapshot or subscribes to be woken on change.
#[derive(Debug)]
pub struct StatusMirror {
    tx: watch::Sender<CompressorStatus>,
}

impl StatusMirror {
    /// A mirror holding the boot defaults (all zero/false).
    pub fn new() -> Self {
        Self::with_status(CompressorStatus::default())
    }

    pub fn with_status(status: CompressorStatus) -> Self {
        let (tx, _rx) = watch::channel(status);
        Self { tx }
    }

    /// A copy of the current status.
    pub fn snapshot(&self) -> CompressorStatus {
        *self.tx.borrow()
    }

    /// A receiver that is notified whenever an update changes a field.
    pub fn subscribe(&self) -> watch::Receiver<CompressorStatus> {
        self.tx.subscribe()
    }

    /// Runs the reducer against the mirror. Subscribers are only woken
    /// if something changed.
    pub fn apply(&self, info: &Info) -> bool {
        let changed = self
            .tx
            .send_if_modified(|status| apply_info(status, info));
        if changed {
            debug!(status = %self.snapshot(), "status mirror updated");
        }
        changed
    }
}

impl Default for StatusMirror {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
