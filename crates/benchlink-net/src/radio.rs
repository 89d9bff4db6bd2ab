//! The Wi-Fi radio, as the network manager sees it.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{NetworkCredentials, RadioError};

/// Radio-specific security mode code, as reported by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthMode(pub u8);

impl AuthMode {
    pub const OPEN: AuthMode = AuthMode(0);
    /// WPA with TKIP.
    pub const WPA_TKIP_PSK: AuthMode = AuthMode(5);
    /// WPA2 with AES (or mixed).
    pub const WPA2_AES_PSK: AuthMode = AuthMode(7);
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One network seen during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub ssid: String,
    /// Signal strength in dBm; larger (closer to zero) is stronger.
    pub rssi: i16,
    pub auth_mode: AuthMode,
}

impl ScanRecord {
    pub fn new(ssid: impl Into<String>, rssi: i16, auth_mode: AuthMode) -> Self {
        Self {
            ssid: ssid.into(),
            rssi,
            auth_mode,
        }
    }
}

/// Driver for the Wi-Fi chip.
///
/// The manager calls these strictly one at a time and tracks mode state
/// itself, so an implementation never sees `enable_station` twice in a row
/// without a `disable_station` between.
///
/// Methods return `impl Future + Send` so the manager can run on a
/// multi-threaded runtime; implementations may simply write `async fn`.
pub trait Radio: Send + 'static {
    fn enable_station(&mut self) -> impl Future<Output = Result<(), RadioError>> + Send;

    fn disable_station(&mut self) -> impl Future<Output = Result<(), RadioError>> + Send;

    fn enable_access_point(
        &mut self,
        ssid: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), RadioError>> + Send;

    fn disable_access_point(&mut self) -> impl Future<Output = Result<(), RadioError>> + Send;

    /// Joins the network described by `credentials`, giving up after
    /// `timeout`.
    fn connect(
        &mut self,
        credentials: &NetworkCredentials,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), RadioError>> + Send;

    /// Drops any half-finished association after a failed attempt.
    fn leave(&mut self) -> impl Future<Output = ()> + Send;

    /// Whether the station link is currently up.
    fn link_up(&self) -> bool;

    /// Scans for nearby networks. May return duplicates and hidden
    /// (empty-SSID) entries; the manager filters them.
    fn scan(&mut self) -> impl Future<Output = Result<Vec<ScanRecord>, RadioError>> + Send;
}
