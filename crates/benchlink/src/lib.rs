//! # benchlink
//!
//! Core of a Wi-Fi bench controller that talks to a compressor node.
//!
//! A [`Controller`] owns the three moving parts: the network manager that
//! keeps the radio connected (falling back to a provisioning access point),
//! the single-peer TCP message server, and the [`SharedState`] both of them
//! and any UI tasks share. UI code sends commands through
//! `shared().commands` and reads the compressor's state from
//! `shared().mirror`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use benchlink::prelude::*;
//!
//! # async fn boot() -> Result<(), BenchlinkError> {
//! let controller = Controller::builder()
//!     .bind("0.0.0.0:3000")
//!     .build(HostRadio::new(), LoggingServices, MemoryCredentialStore::new())?;
//!
//! controller.shared().commands.send_on()?;
//! controller.run().await;
//! # Ok(())
//! # }
//! ```
//!
//! [`SharedState`]: benchlink_state::SharedState

mod controller;
mod error;
mod host;

pub use controller::{Controller, ControllerBuilder, ControllerConfig};
pub use error::BenchlinkError;
pub use host::{HostRadio, LogSink, LoggingServices, log_infos};

pub use benchlink_net as net;
pub use benchlink_protocol as protocol;
pub use benchlink_server as server;
pub use benchlink_state as state;

pub mod prelude {
    pub use crate::{
        BenchlinkError, Controller, ControllerBuilder, ControllerConfig, HostRadio, LogSink,
        LoggingServices, log_infos,
    };
    pub use benchlink_net::{
        CredentialStore, MemoryCredentialStore, NetworkConfig, NetworkCredentials, NetworkPhase,
        NetworkState, NetworkStatus, StatusIndicator, run_indicator,
    };
    pub use benchlink_protocol::{Command, CompressorStatus, Info, Message};
    pub use benchlink_server::ServerConfig;
    pub use benchlink_state::{NetworkSignal, SharedState};
}
