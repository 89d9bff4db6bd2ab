//! Local network services: provisioning surface and mDNS advertisement.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{ScanRecord, ServiceError};

/// Which radio interface a service is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interface {
    Station,
    AccessPoint,
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Station => f.write_str("station"),
            Self::AccessPoint => f.write_str("access-point"),
        }
    }
}

/// How the controller names itself on the local network.
///
/// The compressor node finds us by browsing for `service` over TCP and
/// connecting to the advertised port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceAdvert {
    pub hostname: String,
    pub instance: String,
    pub service: String,
}

impl Default for ServiceAdvert {
    fn default() -> Self {
        Self {
            hostname: "bench".to_string(),
            instance: "Bench".to_string(),
            service: "_bench".to_string(),
        }
    }
}

/// The services that run on top of whichever interface is up.
///
/// `start_provisioning` brings up the configuration surface (HTTP form plus
/// DHCP pool on the access point). Credentials submitted through it are
/// written to the [`CredentialStore`](crate::CredentialStore), which the
/// manager polls.
pub trait LocalServices: Send + 'static {
    fn start_provisioning(
        &mut self,
        networks: &[ScanRecord],
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    fn stop_provisioning(&mut self) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Announces `advert` on `interface`, reachable on TCP `port`.
    fn advertise(
        &mut self,
        interface: Interface,
        advert: &ServiceAdvert,
        port: u16,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Removes every advertisement from `interface`.
    fn withdraw(&mut self, interface: Interface) -> impl Future<Output = Result<(), ServiceError>> + Send;
}
