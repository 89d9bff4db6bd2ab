//! Read-only view of the network manager for displays and indicators.

use std::fmt;
use std::sync::Arc;

use benchlink_state::SharedState;
use serde::Serialize;
use tokio::sync::watch;

use crate::ScanRecord;

/// Where the network state machine currently is. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkState {
    /// Booting, or restarting after the link dropped.
    Startup,
    /// Trying to join the configured network.
    Connecting,
    /// Joined, message server up.
    Connected,
    /// Serving the provisioning access point.
    Provisioning,
    /// New credentials arrived; switching back to station mode.
    Configured,
    /// The message server failed and is waiting to be restarted.
    SocketFailed,
}

impl fmt::Display for NetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Startup => "STARTUP",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::Provisioning => "PROVISIONING",
            Self::Configured => "CONFIGURED",
            Self::SocketFailed => "SOCKET_FAILED",
        };
        f.write_str(name)
    }
}

/// Coarse phase shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkPhase {
    Initializing,
    Scanning,
    Provisioning,
    Connecting,
    ConnectedIdle,
    ConnectedActive,
    Error,
}

/// What the manager publishes after every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ManagerStatus {
    pub(crate) state: NetworkState,
    pub(crate) scanning: bool,
    /// A handler failed and the manager is about to restart.
    pub(crate) fault: bool,
    pub(crate) scan_results: Vec<ScanRecord>,
}

impl Default for ManagerStatus {
    fn default() -> Self {
        Self {
            state: NetworkState::Startup,
            scanning: false,
            fault: false,
            scan_results: Vec::new(),
        }
    }
}

/// Cloneable handle onto the manager's published status.
#[derive(Debug, Clone)]
pub struct NetworkStatus {
    rx: watch::Receiver<ManagerStatus>,
    shared: Arc<SharedState>,
}

impl NetworkStatus {
    pub(crate) fn new(rx: watch::Receiver<ManagerStatus>, shared: Arc<SharedState>) -> Self {
        Self { rx, shared }
    }

    pub fn state(&self) -> NetworkState {
        self.rx.borrow().state
    }

    pub fn phase(&self) -> NetworkPhase {
        let status = self.rx.borrow();
        if status.fault {
            return NetworkPhase::Error;
        }
        match status.state {
            NetworkState::Startup if status.scanning => NetworkPhase::Scanning,
            NetworkState::Startup => NetworkPhase::Initializing,
            NetworkState::Connecting | NetworkState::Configured => NetworkPhase::Connecting,
            NetworkState::Provisioning => NetworkPhase::Provisioning,
            NetworkState::Connected if self.shared.peer_connected() => {
                NetworkPhase::ConnectedActive
            }
            NetworkState::Connected => NetworkPhase::ConnectedIdle,
            NetworkState::SocketFailed => NetworkPhase::Error,
        }
    }

    /// The networks retained from the last scan, strongest first.
    pub fn scan_results(&self) -> Vec<ScanRecord> {
        self.rx.borrow().scan_results.clone()
    }

    /// Waits for the manager to publish a change.
    ///
    /// Returns `false` once the manager is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_with(state: NetworkState) -> (watch::Sender<ManagerStatus>, NetworkStatus, Arc<SharedState>) {
        let shared = Arc::new(SharedState::new());
        let (tx, rx) = watch::channel(ManagerStatus {
            state,
            ..ManagerStatus::default()
        });
        (tx, NetworkStatus::new(rx, Arc::clone(&shared)), shared)
    }

    #[test]
    fn test_connected_phase_tracks_peer() {
        let (_tx, status, shared) = status_with(NetworkState::Connected);
        assert_eq!(status.phase(), NetworkPhase::ConnectedIdle);
        shared.set_peer_connected(true);
        assert_eq!(status.phase(), NetworkPhase::ConnectedActive);
    }

    #[test]
    fn test_startup_phase_reflects_scanning() {
        let (tx, status, _shared) = status_with(NetworkState::Startup);
        assert_eq!(status.phase(), NetworkPhase::Initializing);
        tx.send_modify(|s| s.scanning = true);
        assert_eq!(status.phase(), NetworkPhase::Scanning);
    }

    #[test]
    fn test_fault_overrides_state() {
        let (tx, status, _shared) = status_with(NetworkState::Provisioning);
        assert_eq!(status.phase(), NetworkPhase::Provisioning);
        tx.send_modify(|s| s.fault = true);
        assert_eq!(status.phase(), NetworkPhase::Error);
        assert_eq!(status.state(), NetworkState::Provisioning);
    }
}
