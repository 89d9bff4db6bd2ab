//! Network manager configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{AuthMode, ServiceAdvert, SocketBackoff};

/// Tunables for [`NetworkManager`](crate::NetworkManager).
///
/// Durations are milliseconds. All fields default to the values the
/// bench firmware shipped with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Connection attempts per credential set before giving up.
    pub connect_retries: u32,
    pub attempt_timeout_ms: u64,
    /// Pause between failed attempts.
    pub retry_delay_ms: u64,
    /// How many scan results to keep for the provisioning page.
    pub max_scan_results: usize,
    pub supported_auth_modes: Vec<AuthMode>,
    /// Access point the provisioning surface is served on.
    pub ap_ssid: String,
    pub ap_password: String,
    /// How often the provisioning watcher checks for new credentials.
    pub credential_poll_ms: u64,
    /// Pause after clearing rejected credentials.
    pub credential_reset_settle_ms: u64,
    pub backoff_base_ms: u64,
    pub backoff_step_ms: u64,
    pub backoff_ceiling_ms: u64,
    /// Server uptime after which the backoff starts over. `null` keeps
    /// growing it for the life of the process.
    pub backoff_reset_after_ms: Option<u64>,
    pub advert: ServiceAdvert,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_retries: 3,
            attempt_timeout_ms: 30_000,
            retry_delay_ms: 2_000,
            max_scan_results: 5,
            supported_auth_modes: vec![AuthMode::WPA_TKIP_PSK, AuthMode::WPA2_AES_PSK],
            ap_ssid: "Pico-Bench".to_string(),
            ap_password: "password".to_string(),
            credential_poll_ms: 100,
            credential_reset_settle_ms: 500,
            backoff_base_ms: 5_000,
            backoff_step_ms: 5_000,
            backoff_ceiling_ms: 120_000,
            backoff_reset_after_ms: Some(300_000),
            advert: ServiceAdvert::default(),
        }
    }
}

impl NetworkConfig {
    /// WPA2 needs at least eight characters.
    pub const MIN_AP_PASSWORD_LEN: usize = 8;

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called by [`NetworkManager::new`](crate::NetworkManager::new). Rules:
    /// - at least one connection attempt;
    /// - no zero poll or retry interval (the manager must never spin);
    /// - backoff ceiling no lower than its base;
    /// - AP password long enough for WPA2, else the default.
    pub fn validated(mut self) -> Self {
        if self.connect_retries == 0 {
            warn!("connect_retries is 0, using 1");
            self.connect_retries = 1;
        }
        if self.credential_poll_ms == 0 {
            warn!("credential_poll_ms is 0, using 1 ms");
            self.credential_poll_ms = 1;
        }
        if self.retry_delay_ms == 0 {
            warn!("retry_delay_ms is 0, using 1 ms");
            self.retry_delay_ms = 1;
        }
        if self.backoff_base_ms == 0 {
            warn!("backoff_base_ms is 0, using 1 ms");
            self.backoff_base_ms = 1;
        }
        if self.backoff_ceiling_ms < self.backoff_base_ms {
            warn!(
                ceiling = self.backoff_ceiling_ms,
                base = self.backoff_base_ms,
                "backoff ceiling below base, raising it"
            );
            self.backoff_ceiling_ms = self.backoff_base_ms;
        }
        if self.ap_password.len() < Self::MIN_AP_PASSWORD_LEN {
            warn!("ap_password shorter than 8 characters, using default");
            self.ap_password = Self::default().ap_password;
        }
        if self.supported_auth_modes.is_empty() {
            warn!("no supported auth modes, provisioning list will be empty");
        }
        self
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn credential_poll(&self) -> Duration {
        Duration::from_millis(self.credential_poll_ms)
    }

    pub fn credential_reset_settle(&self) -> Duration {
        Duration::from_millis(self.credential_reset_settle_ms)
    }

    pub fn backoff(&self) -> SocketBackoff {
        SocketBackoff::new(
            Duration::from_millis(self.backoff_base_ms),
            Duration::from_millis(self.backoff_step_ms),
            Duration::from_millis(self.backoff_ceiling_ms),
            self.backoff_reset_after_ms.map(Duration::from_millis),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_fixes_unsafe_values() {
        let config = NetworkConfig {
            connect_retries: 0,
            credential_poll_ms: 0,
            backoff_base_ms: 10_000,
            backoff_ceiling_ms: 1_000,
            ap_password: "short".to_string(),
            ..Default::default()
        }
        .validated();

        assert_eq!(config.connect_retries, 1);
        assert_eq!(config.credential_poll_ms, 1);
        assert_eq!(config.backoff_ceiling_ms, 10_000);
        assert_eq!(config.ap_password, "password");
    }

    #[test]
    fn test_null_reset_after_disables_reset() {
        let config: NetworkConfig =
            serde_json::from_str(r#"{"backoff_reset_after_ms":null}"#).unwrap();
        assert_eq!(config.backoff_reset_after_ms, None);
        assert_eq!(config.connect_retries, 3);
        assert_eq!(config.supported_auth_modes, vec![AuthMode(5), AuthMode(7)]);
    }
}
