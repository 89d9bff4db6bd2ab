//! `Controller` builder and run loop.
//!
//! This is the entry point for running a bench controller. It ties
//! together all the layers: shared state → message server → network
//! manager.

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use benchlink_net::{
    CredentialStore, LocalServices, MemoryCredentialStore, NetworkConfig, NetworkCredentials,
    NetworkManager, NetworkStatus, Radio,
};
use benchlink_server::{MessageServer, ServerConfig, ServerError};
use benchlink_state::SharedState;
use serde::Deserialize;
use tracing::info;

use crate::{BenchlinkError, HostRadio, LoggingServices};

/// Everything a controller can be configured with, as one JSON document.
///
/// ```json
/// {
///   "server": { "bind_addr": "0.0.0.0:3000" },
///   "network": { "connect_retries": 5, "backoff_reset_after_ms": null },
///   "credentials": { "ssid": "workshop", "password": "hunter22" }
/// }
/// ```
///
/// Missing sections and fields take their defaults. `credentials` seeds
/// the credential store on boot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub server: ServerConfig,
    pub network: NetworkConfig,
    pub credentials: Option<NetworkCredentials>,
}

impl ControllerConfig {
    pub fn from_json(text: &str) -> Result<Self, BenchlinkError> {
        serde_json::from_str(text).map_err(BenchlinkError::Config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BenchlinkError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Builder for configuring a [`Controller`].
///
/// # Example
///
/// ```rust,ignore
/// use benchlink::prelude::*;
///
/// let controller = Controller::builder()
///     .bind("0.0.0.0:3000")
///     .build(radio, services, MemoryCredentialStore::new())?;
/// controller.run().await;
/// ```
pub struct ControllerBuilder {
    server_config: ServerConfig,
    network_config: NetworkConfig,
}

impl ControllerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            server_config: ServerConfig::default(),
            network_config: NetworkConfig::default(),
        }
    }

    /// Takes the server and network sections of a config document.
    pub fn config(mut self, config: &ControllerConfig) -> Self {
        self.server_config = config.server.clone();
        self.network_config = config.network.clone();
        self
    }

    /// Sets the address the message server listens on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.server_config.bind_addr = addr.to_string();
        self
    }

    pub fn server_config(mut self, config: ServerConfig) -> Self {
        self.server_config = config;
        self
    }

    pub fn network_config(mut self, config: NetworkConfig) -> Self {
        self.network_config = config;
        self
    }

    /// Creates the shared state, message server and network manager.
    ///
    /// Nothing runs until [`Controller::run`]. The bind address is checked
    /// here so a typo fails at boot rather than as a restart loop.
    pub fn build<R, V, S>(
        self,
        radio: R,
        services: V,
        store: S,
    ) -> Result<Controller<R, V, S>, BenchlinkError>
    where
        R: Radio,
        V: LocalServices,
        S: CredentialStore,
    {
        let addr = &self.server_config.bind_addr;
        addr.parse::<SocketAddr>()
            .map_err(|source| ServerError::InvalidAddress {
                addr: addr.clone(),
                source,
            })?;

        let shared = Arc::new(SharedState::new());
        let server = Arc::new(MessageServer::new(
            Arc::clone(&shared),
            self.server_config,
        ));
        let manager = NetworkManager::new(
            Arc::clone(&shared),
            Arc::clone(&server),
            radio,
            services,
            Arc::new(store),
            self.network_config,
        );

        Ok(Controller {
            shared,
            server,
            manager,
        })
    }
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bench controller, ready to run.
///
/// The type parameters default to the host collaborators.
pub struct Controller<R = HostRadio, V = LoggingServices, S = MemoryCredentialStore> {
    shared: Arc<SharedState>,
    server: Arc<MessageServer>,
    manager: NetworkManager<R, V, S, Arc<MessageServer>>,
}

impl Controller {
    /// Creates a new builder.
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }
}

impl<R, V, S> Controller<R, V, S>
where
    R: Radio,
    V: LocalServices,
    S: CredentialStore,
{
    /// The mirror, channels and signals shared with every task.
    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }

    pub fn status(&self) -> NetworkStatus {
        self.manager.status()
    }

    pub fn server(&self) -> &Arc<MessageServer> {
        &self.server
    }

    /// Drives the network manager until the process ends.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await;
    }

    /// Drives the network manager until `shutdown` completes, then stops
    /// the message server.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) {
        let Self {
            server, manager, ..
        } = self;

        info!(port = server.port(), "bench controller running");
        tokio::select! {
            () = manager.run() => {}
            () = shutdown => info!("shutdown requested"),
        }
        server.stop().await;
    }
}
