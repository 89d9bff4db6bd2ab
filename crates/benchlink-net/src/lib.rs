//! Wi-Fi mode management for benchlink.
//!
//! [`NetworkManager`] joins the configured network in station mode and
//! starts the message server once the link is up. When there are no
//! credentials, or they stop working, it falls back to an access point with
//! a provisioning surface and waits for new credentials to be stored.
//!
//! Hardware and platform services sit behind three traits so the state
//! machine runs unchanged on the board and in tests:
//!
//! - [`Radio`] switches modes, connects and scans;
//! - [`LocalServices`] runs the provisioning surface and mDNS adverts;
//! - [`CredentialStore`] persists the network to join.
//!
//! [`NetworkStatus`] and [`StatusIndicator`] give displays a read-only view.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod backoff;
mod config;
mod control;
mod credentials;
mod error;
mod indicator;
mod manager;
mod radio;
mod scan;
mod services;
mod status;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use backoff::SocketBackoff;
pub use config::NetworkConfig;
pub use control::ServerControl;
pub use credentials::{
    CredentialStore, MemoryCredentialStore, NetworkCredentials, PASSWORD_MAX_LEN, SSID_MAX_LEN,
};
pub use error::{CredentialError, NetError, RadioError, ServiceError};
pub use indicator::{IndicatorSink, LedPattern, Rgb, StatusIndicator, run_indicator};
pub use manager::NetworkManager;
pub use radio::{AuthMode, Radio, ScanRecord};
pub use scan::TopScanResults;
pub use services::{Interface, LocalServices, ServiceAdvert};
pub use status::{NetworkPhase, NetworkState, NetworkStatus};
