//! The network mode state machine.
//!
//! The manager owns the radio. It sleeps on the shared [`SignalSet`] and,
//! each time it wakes, services every pending signal in priority order:
//!
//! ```text
//! STARTUP ──creds ok──────────────► WIFI_CONNECTED ──► server running
//!    │                                     ▲                 │
//!    └─no creds / failed─► WIFI_CONNECTION_FAILED            │ listener failed
//!                              │ (AP + provisioning)         ▼
//!                              ▼                     SOCKET_SERVER_FAILED
//!                          CONFIGURED ──ok──► WIFI_CONNECTED   │ link up: backoff
//!                              │                               │ link down: STARTUP
//!                              └─failed: clear creds ─► WIFI_CONNECTION_FAILED
//! ```
//!
//! Handlers run one at a time on the manager's own task, so at most one
//! connection attempt is ever in flight.
//!
//! [`SignalSet`]: benchlink_state::SignalSet

use std::sync::Arc;
use std::time::Duration;

use benchlink_state::{NetworkSignal, PendingSignals, SharedState};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::status::ManagerStatus;
use crate::{
    CredentialStore, Interface, LocalServices, NetError, NetworkConfig, NetworkCredentials,
    NetworkState, NetworkStatus, Radio, RadioError, ServerControl, SocketBackoff, TopScanResults,
};

/// Which modes and services are currently up. Every switch checks its
/// flag first, so enabling an active mode (or withdrawing an absent
/// advertisement) is a no-op.
#[derive(Debug, Default)]
struct Modes {
    station: bool,
    access_point: bool,
    provisioning: bool,
    station_advert: bool,
    access_point_advert: bool,
}

/// Drives the radio between station and access-point mode and keeps the
/// message server running while the station link is up.
pub struct NetworkManager<R, V, S, C> {
    shared: Arc<SharedState>,
    server: C,
    radio: R,
    services: V,
    store: Arc<S>,
    config: NetworkConfig,
    modes: Modes,
    scan_results: TopScanResults,
    backoff: SocketBackoff,
    server_started_at: Option<Instant>,
    /// How long the last server run lasted. Survives a link-loss restart
    /// so the next retry can still count it as healthy.
    last_run: Option<Duration>,
    watcher: Option<JoinHandle<()>>,
    status_tx: watch::Sender<ManagerStatus>,
}

impl<R, V, S, C> NetworkManager<R, V, S, C>
where
    R: Radio,
    V: LocalServices,
    S: CredentialStore,
    C: ServerControl,
{
    pub fn new(
        shared: Arc<SharedState>,
        server: C,
        radio: R,
        services: V,
        store: Arc<S>,
        config: NetworkConfig,
    ) -> Self {
        let config = config.validated();
        let (status_tx, _) = watch::channel(ManagerStatus::default());
        Self {
            shared,
            server,
            radio,
            services,
            store,
            modes: Modes::default(),
            scan_results: TopScanResults::new(config.max_scan_results),
            backoff: config.backoff(),
            server_started_at: None,
            last_run: None,
            watcher: None,
            status_tx,
            config,
        }
    }

    /// A handle for displays and the status indicator.
    pub fn status(&self) -> NetworkStatus {
        NetworkStatus::new(self.status_tx.subscribe(), Arc::clone(&self.shared))
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn backoff(&self) -> &SocketBackoff {
        &self.backoff
    }

    /// Raises `STARTUP` and services signals forever.
    pub async fn run(mut self) {
        info!("network manager started");
        self.shared.raise(NetworkSignal::Startup);
        loop {
            self.step().await;
        }
    }

    /// Waits for at least one signal, then services everything that was
    /// pending, highest priority first. Returns what was serviced.
    pub async fn step(&mut self) -> PendingSignals {
        let pending = self.shared.signals.wait().await;
        for signal in pending.iter() {
            self.service(signal).await;
        }
        pending
    }

    /// Runs the handler for one signal.
    ///
    /// A handler that fails (the radio refused a mode switch, say) marks
    /// the status as faulted and schedules a full restart after the retry
    /// delay.
    pub async fn service(&mut self, signal: NetworkSignal) {
        info!(%signal, "handling network signal");
        self.status_tx.send_modify(|s| s.fault = false);

        let result = match signal {
            NetworkSignal::Startup => self.handle_startup().await,
            NetworkSignal::WifiConnectionFailed => self.handle_wifi_failed().await,
            NetworkSignal::Configured => self.handle_configured().await,
            NetworkSignal::WifiConnected => self.handle_wifi_connected().await,
            NetworkSignal::SocketServerFailed => self.handle_socket_failed().await,
        };

        if let Err(e) = result {
            error!(%signal, error = %e, "network handler failed, restarting");
            self.status_tx.send_modify(|s| s.fault = true);
            tokio::time::sleep(self.config.retry_delay()).await;
            self.shared.raise(NetworkSignal::Startup);
        }
    }

    // -----------------------------------------------------------------------
    // Signal handlers
    // -----------------------------------------------------------------------

    async fn handle_startup(&mut self) -> Result<(), NetError> {
        self.set_state(NetworkState::Startup);
        self.enable_station().await?;

        match self.load_credentials().await {
            Some(credentials) => {
                if self.connect(&credentials).await {
                    self.shared.raise(NetworkSignal::WifiConnected);
                    return Ok(());
                }
                self.set_state(NetworkState::Startup);
            }
            None => info!("no stored Wi-Fi credentials"),
        }

        self.scan().await;
        self.shared.raise(NetworkSignal::WifiConnectionFailed);
        Ok(())
    }

    async fn handle_wifi_failed(&mut self) -> Result<(), NetError> {
        self.disable_station().await?;
        self.enable_access_point().await?;
        self.start_provisioning().await?;
        self.advertise(Interface::AccessPoint).await;
        self.start_watcher();
        self.set_state(NetworkState::Provisioning);
        Ok(())
    }

    async fn handle_configured(&mut self) -> Result<(), NetError> {
        self.stop_watcher();
        self.set_state(NetworkState::Configured);

        self.withdraw(Interface::AccessPoint).await;
        self.stop_provisioning().await?;
        self.disable_access_point().await?;
        self.enable_station().await?;

        let connected = match self.load_credentials().await {
            Some(credentials) => self.connect(&credentials).await,
            None => {
                warn!("configured without credentials");
                false
            }
        };
        if connected {
            self.shared.raise(NetworkSignal::WifiConnected);
            return Ok(());
        }

        warn!("clearing rejected Wi-Fi credentials");
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "could not clear credentials");
        }
        tokio::time::sleep(self.config.credential_reset_settle()).await;
        self.shared.raise(NetworkSignal::WifiConnectionFailed);
        Ok(())
    }

    async fn handle_wifi_connected(&mut self) -> Result<(), NetError> {
        if self.server.is_running() {
            debug!("message server already running");
            self.set_state(NetworkState::Connected);
            return Ok(());
        }

        // A failed start raises SOCKET_SERVER_FAILED itself.
        match self.server.start() {
            Ok(addr) => {
                info!(%addr, "message server started");
                self.server_started_at = Some(Instant::now());
                self.set_state(NetworkState::Connected);
            }
            Err(e) => {
                warn!(error = %e, "message server did not start");
                self.set_state(NetworkState::SocketFailed);
            }
        }
        Ok(())
    }

    async fn handle_socket_failed(&mut self) -> Result<(), NetError> {
        self.server.stop().await;
        if let Some(at) = self.server_started_at.take() {
            self.last_run = Some(at.elapsed());
        }

        if !self.radio.link_up() {
            warn!("Wi-Fi link lost, restarting");
            self.withdraw(Interface::Station).await;
            self.shared.raise(NetworkSignal::Startup);
            return Ok(());
        }

        self.set_state(NetworkState::SocketFailed);
        let delay = self.backoff.on_failure(self.last_run.take());
        info!(delay_ms = delay.as_millis() as u64, "retrying message server after backoff");
        tokio::time::sleep(delay).await;
        self.shared.raise(NetworkSignal::WifiConnected);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Connection and scanning
    // -----------------------------------------------------------------------

    async fn load_credentials(&self) -> Option<NetworkCredentials> {
        match self.store.load().await {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(error = %e, "could not read credentials");
                None
            }
        }
    }

    /// Bounded retry loop. On success the service is advertised on the
    /// station interface.
    async fn connect(&mut self, credentials: &NetworkCredentials) -> bool {
        self.set_state(NetworkState::Connecting);
        let retries = self.config.connect_retries;
        let timeout = self.config.attempt_timeout();

        for attempt in 1..=retries {
            info!(ssid = credentials.ssid(), attempt, retries, "connecting to Wi-Fi");
            let outcome = tokio::time::timeout(timeout, self.radio.connect(credentials, timeout))
                .await
                .unwrap_or(Err(RadioError::Timeout));

            match outcome {
                Ok(()) => {
                    info!(ssid = credentials.ssid(), "connected to Wi-Fi");
                    self.advertise(Interface::Station).await;
                    return true;
                }
                Err(e) => {
                    warn!(ssid = credentials.ssid(), attempt, error = %e, "Wi-Fi connection attempt failed");
                    self.radio.leave().await;
                    if attempt < retries {
                        tokio::time::sleep(self.config.retry_delay()).await;
                    }
                }
            }
        }

        warn!(ssid = credentials.ssid(), retries, "could not connect to Wi-Fi");
        false
    }

    async fn scan(&mut self) {
        self.status_tx.send_modify(|s| s.scanning = true);

        let records = match self.radio.scan().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Wi-Fi scan failed");
                Vec::new()
            }
        };
        let seen = records.len();
        self.scan_results = TopScanResults::from_scan(
            records,
            &self.config.supported_auth_modes,
            self.config.max_scan_results,
        );

        info!(seen, kept = self.scan_results.len(), "Wi-Fi scan complete");
        for record in self.scan_results.as_slice() {
            debug!(ssid = %record.ssid, rssi = record.rssi, auth_mode = %record.auth_mode, "nearby network");
        }

        let kept = self.scan_results.to_vec();
        self.status_tx.send_modify(move |s| {
            s.scanning = false;
            s.scan_results = kept;
        });
    }

    // -----------------------------------------------------------------------
    // Mode switches
    // -----------------------------------------------------------------------

    async fn enable_station(&mut self) -> Result<(), NetError> {
        if self.modes.station {
            return Ok(());
        }
        self.radio.enable_station().await?;
        self.modes.station = true;
        debug!("station mode enabled");
        Ok(())
    }

    async fn disable_station(&mut self) -> Result<(), NetError> {
        if !self.modes.station {
            return Ok(());
        }
        self.withdraw(Interface::Station).await;
        self.radio.disable_station().await?;
        self.modes.station = false;
        debug!("station mode disabled");
        Ok(())
    }

    async fn enable_access_point(&mut self) -> Result<(), NetError> {
        if self.modes.access_point {
            return Ok(());
        }
        self.radio
            .enable_access_point(&self.config.ap_ssid, &self.config.ap_password)
            .await?;
        self.modes.access_point = true;
        info!(ssid = %self.config.ap_ssid, "access point enabled");
        Ok(())
    }

    async fn disable_access_point(&mut self) -> Result<(), NetError> {
        if !self.modes.access_point {
            return Ok(());
        }
        self.withdraw(Interface::AccessPoint).await;
        self.radio.disable_access_point().await?;
        self.modes.access_point = false;
        debug!("access point disabled");
        Ok(())
    }

    async fn start_provisioning(&mut self) -> Result<(), NetError> {
        if self.modes.provisioning {
            return Ok(());
        }
        self.services
            .start_provisioning(self.scan_results.as_slice())
            .await?;
        self.modes.provisioning = true;
        info!(networks = self.scan_results.len(), "provisioning started");
        Ok(())
    }

    async fn stop_provisioning(&mut self) -> Result<(), NetError> {
        if !self.modes.provisioning {
            return Ok(());
        }
        self.services.stop_provisioning().await?;
        self.modes.provisioning = false;
        debug!("provisioning stopped");
        Ok(())
    }

    fn advert_flag(&mut self, interface: Interface) -> &mut bool {
        match interface {
            Interface::Station => &mut self.modes.station_advert,
            Interface::AccessPoint => &mut self.modes.access_point_advert,
        }
    }

    /// Advertisement failures are logged, not fatal: the compressor can
    /// still be pointed at the controller by address.
    async fn advertise(&mut self, interface: Interface) {
        if *self.advert_flag(interface) {
            return;
        }
        let port = self.server.port();
        match self
            .services
            .advertise(interface, &self.config.advert, port)
            .await
        {
            Ok(()) => {
                *self.advert_flag(interface) = true;
                info!(%interface, port, service = %self.config.advert.service, "service advertised");
            }
            Err(e) => warn!(%interface, error = %e, "could not advertise service"),
        }
    }

    async fn withdraw(&mut self, interface: Interface) {
        if !*self.advert_flag(interface) {
            return;
        }
        if let Err(e) = self.services.withdraw(interface).await {
            warn!(%interface, error = %e, "could not withdraw advertisement");
        }
        *self.advert_flag(interface) = false;
        debug!(%interface, "advertisement withdrawn");
    }

    // -----------------------------------------------------------------------
    // Credential watcher
    // -----------------------------------------------------------------------

    /// Polls the store until credentials appear, raises `CONFIGURED`, and
    /// exits. At most one runs at a time.
    fn start_watcher(&mut self) {
        if self.watcher.as_ref().is_some_and(|w| !w.is_finished()) {
            debug!("credential watcher already running");
            return;
        }

        let store = Arc::clone(&self.store);
        let shared = Arc::clone(&self.shared);
        let poll = self.config.credential_poll();
        self.watcher = Some(tokio::spawn(async move {
            loop {
                match store.load().await {
                    Ok(Some(credentials)) => {
                        info!(ssid = credentials.ssid(), "Wi-Fi credentials received");
                        shared.raise(NetworkSignal::Configured);
                        return;
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "could not read credentials"),
                }
                tokio::time::sleep(poll).await;
            }
        }));
        debug!("credential watcher started");
    }

    fn stop_watcher(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
            debug!("credential watcher stopped");
        }
    }

    fn set_state(&self, state: NetworkState) {
        let previous = self.status_tx.borrow().state;
        if previous != state {
            info!(from = %previous, to = %state, "network state changed");
        }
        self.status_tx.send_modify(|s| s.state = state);
    }
}

impl<R, V, S, C> Drop for NetworkManager<R, V, S, C> {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}
