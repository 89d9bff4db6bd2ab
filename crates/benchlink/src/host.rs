//! Collaborators for running the controller on a desktop host.
//!
//! The host is already on a network, so [`HostRadio`] joins whatever it is
//! asked to and the message server listens on the host's own interfaces.
//! Provisioning and service adverts are logged instead of served, and
//! compressor events are consumed by [`log_infos`].

use std::sync::Arc;
use std::time::Duration;

use benchlink_net::{
    IndicatorSink, Interface, LocalServices, NetworkCredentials, Radio, RadioError, Rgb,
    ScanRecord, ServiceAdvert, ServiceError,
};
use benchlink_state::SharedState;
use tracing::{debug, info};

/// A radio that is always in range of the requested network.
#[derive(Debug, Default)]
pub struct HostRadio {
    station: bool,
    access_point: bool,
    joined: Option<String>,
    nearby: Vec<ScanRecord>,
}

impl HostRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Networks to report from a scan.
    pub fn with_nearby(nearby: Vec<ScanRecord>) -> Self {
        Self {
            nearby,
            ..Self::default()
        }
    }
}

impl Radio for HostRadio {
    async fn enable_station(&mut self) -> Result<(), RadioError> {
        self.station = true;
        debug!("station interface up");
        Ok(())
    }

    async fn disable_station(&mut self) -> Result<(), RadioError> {
        self.station = false;
        self.joined = None;
        debug!("station interface down");
        Ok(())
    }

    async fn enable_access_point(&mut self, ssid: &str, _password: &str) -> Result<(), RadioError> {
        self.access_point = true;
        info!(ssid, "access point up");
        Ok(())
    }

    async fn disable_access_point(&mut self) -> Result<(), RadioError> {
        self.access_point = false;
        debug!("access point down");
        Ok(())
    }

    async fn connect(
        &mut self,
        credentials: &NetworkCredentials,
        _timeout: Duration,
    ) -> Result<(), RadioError> {
        if !self.station {
            return Err(RadioError::Driver("station interface is down".into()));
        }
        self.joined = Some(credentials.ssid().to_string());
        info!(ssid = credentials.ssid(), "joined network");
        Ok(())
    }

    async fn leave(&mut self) {
        self.joined = None;
    }

    fn link_up(&self) -> bool {
        self.station && self.joined.is_some()
    }

    async fn scan(&mut self) -> Result<Vec<ScanRecord>, RadioError> {
        Ok(self.nearby.clone())
    }
}

/// Logs provisioning and advert changes.
#[derive(Debug, Default)]
pub struct LoggingServices;

impl LocalServices for LoggingServices {
    async fn start_provisioning(&mut self, networks: &[ScanRecord]) -> Result<(), ServiceError> {
        info!(networks = networks.len(), "provisioning surface up");
        for network in networks {
            info!(ssid = %network.ssid, rssi = network.rssi, "offering network");
        }
        Ok(())
    }

    async fn stop_provisioning(&mut self) -> Result<(), ServiceError> {
        info!("provisioning surface down");
        Ok(())
    }

    async fn advertise(
        &mut self,
        interface: Interface,
        advert: &ServiceAdvert,
        port: u16,
    ) -> Result<(), ServiceError> {
        info!(
            %interface,
            hostname = %advert.hostname,
            instance = %advert.instance,
            service = %advert.service,
            port,
            "advertising"
        );
        Ok(())
    }

    async fn withdraw(&mut self, interface: Interface) -> Result<(), ServiceError> {
        info!(%interface, "advert withdrawn");
        Ok(())
    }
}

/// Logs the status LED colour whenever it changes.
#[derive(Debug, Default)]
pub struct LogSink {
    last: Option<Rgb>,
}

impl IndicatorSink for LogSink {
    fn show(&mut self, color: Rgb) {
        if self.last != Some(color) {
            debug!(%color, "status LED");
            self.last = Some(color);
        }
    }
}

/// Drains the info queue, logging each compressor event.
///
/// Something has to consume `shared.infos` or it fills after five events
/// and the rest are dropped. A UI would react to them; the host just logs.
pub async fn log_infos(shared: Arc<SharedState>) {
    loop {
        let info = shared.infos.recv().await;
        info!(info = %info.info_type(), "compressor event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use benchlink_net::AuthMode;
    use benchlink_protocol::Info;

    #[tokio::test]
    async fn test_host_radio_link_follows_connection() {
        let mut radio = HostRadio::new();
        let credentials = NetworkCredentials::new("lab", "hunter22", AuthMode::WPA2_AES_PSK).unwrap();

        assert!(radio.connect(&credentials, Duration::from_secs(1)).await.is_err());

        radio.enable_station().await.unwrap();
        radio.connect(&credentials, Duration::from_secs(1)).await.unwrap();
        assert!(radio.link_up());

        radio.disable_station().await.unwrap();
        assert!(!radio.link_up());
    }

    #[tokio::test]
    async fn test_host_radio_reports_configured_scan() {
        let mut radio = HostRadio::with_nearby(vec![ScanRecord::new("lab", -50, AuthMode::WPA2_AES_PSK)]);
        let nearby = radio.scan().await.unwrap();
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].ssid, "lab");
    }

    #[tokio::test]
    async fn test_info_queue_is_drained() {
        let shared = Arc::new(SharedState::new());
        let consumer = tokio::spawn(log_infos(Arc::clone(&shared)));

        for i in 0..20 {
            let info = if i % 2 == 0 { Info::MotorStart } else { Info::MotorStop };
            shared.infos.try_send(info).unwrap();
            for _ in 0..100 {
                if shared.infos.is_empty() {
                    break;
                }
                tokio::task::yield_now().await;
            }
        }

        assert!(shared.infos.is_empty());
        assert_eq!(shared.infos.dropped(), 0);
        consumer.abort();
    }
}
