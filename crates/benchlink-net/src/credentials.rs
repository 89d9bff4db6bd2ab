//! Wi-Fi credentials and where they are kept.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::{AuthMode, CredentialError};

/// Longest SSID the 802.11 standard allows.
pub const SSID_MAX_LEN: usize = 32;
/// Longest WPA passphrase.
pub const PASSWORD_MAX_LEN: usize = 64;

/// A validated SSID/password pair.
///
/// `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "CredentialsDocument")]
pub struct NetworkCredentials {
    ssid: String,
    password: String,
    auth_mode: AuthMode,
}

impl NetworkCredentials {
    /// # Errors
    /// Rejects an empty SSID, or an SSID/password longer than
    /// [`SSID_MAX_LEN`]/[`PASSWORD_MAX_LEN`] bytes.
    pub fn new(
        ssid: impl Into<String>,
        password: impl Into<String>,
        auth_mode: AuthMode,
    ) -> Result<Self, CredentialError> {
        let ssid = ssid.into();
        let password = password.into();

        if ssid.is_empty() {
            return Err(CredentialError::EmptySsid);
        }
        if ssid.len() > SSID_MAX_LEN {
            return Err(CredentialError::SsidTooLong {
                len: ssid.len(),
                max: SSID_MAX_LEN,
            });
        }
        if password.len() > PASSWORD_MAX_LEN {
            return Err(CredentialError::PasswordTooLong {
                len: password.len(),
                max: PASSWORD_MAX_LEN,
            });
        }

        Ok(Self {
            ssid,
            password,
            auth_mode,
        })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }
}

impl fmt::Debug for NetworkCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .field("auth_mode", &self.auth_mode)
            .finish()
    }
}

#[derive(Deserialize)]
struct CredentialsDocument {
    ssid: String,
    #[serde(default)]
    password: String,
    #[serde(default = "default_auth_mode")]
    auth_mode: AuthMode,
}

fn default_auth_mode() -> AuthMode {
    AuthMode::WPA2_AES_PSK
}

impl TryFrom<CredentialsDocument> for NetworkCredentials {
    type Error = CredentialError;

    fn try_from(doc: CredentialsDocument) -> Result<Self, Self::Error> {
        Self::new(doc.ssid, doc.password, doc.auth_mode)
    }
}

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

/// Persistent home of the station credentials.
///
/// On the device this is the settings flash page; the provisioning surface
/// writes to it and the network manager reads and clears it. Shared
/// between tasks, so methods take `&self`.
pub trait CredentialStore: Send + Sync + 'static {
    fn load(&self) -> impl Future<Output = Result<Option<NetworkCredentials>, CredentialError>> + Send;

    fn store(
        &self,
        credentials: NetworkCredentials,
    ) -> impl Future<Output = Result<(), CredentialError>> + Send;

    fn clear(&self) -> impl Future<Output = Result<(), CredentialError>> + Send;
}

impl<T: CredentialStore> CredentialStore for Arc<T> {
    fn load(&self) -> impl Future<Output = Result<Option<NetworkCredentials>, CredentialError>> + Send {
        (**self).load()
    }

    fn store(
        &self,
        credentials: NetworkCredentials,
    ) -> impl Future<Output = Result<(), CredentialError>> + Send {
        (**self).store(credentials)
    }

    fn clear(&self) -> impl Future<Output = Result<(), CredentialError>> + Send {
        (**self).clear()
    }
}

/// In-memory [`CredentialStore`], for hosts without a settings page.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Option<NetworkCredentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: NetworkCredentials) -> Self {
        Self {
            inner: RwLock::new(Some(credentials)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<NetworkCredentials>, CredentialError> {
        Ok(self.inner.read().await.clone())
    }

    async fn store(&self, credentials: NetworkCredentials) -> Result<(), CredentialError> {
        *self.inner.write().await = Some(credentials);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialError> {
        *self.inner.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_oversized_fields() {
        assert_eq!(
            NetworkCredentials::new("", "pw", AuthMode::WPA2_AES_PSK),
            Err(CredentialError::EmptySsid)
        );
        assert!(matches!(
            NetworkCredentials::new("x".repeat(33), "pw", AuthMode::WPA2_AES_PSK),
            Err(CredentialError::SsidTooLong { len: 33, .. })
        ));
        assert!(matches!(
            NetworkCredentials::new("home", "p".repeat(65), AuthMode::WPA2_AES_PSK),
            Err(CredentialError::PasswordTooLong { len: 65, .. })
        ));
        assert!(NetworkCredentials::new("x".repeat(32), "p".repeat(64), AuthMode(5)).is_ok());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = NetworkCredentials::new("home", "hunter2", AuthMode(7)).unwrap();
        let printed = format!("{creds:?}");
        assert!(printed.contains("home"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_deserialize_validates() {
        let creds: NetworkCredentials =
            serde_json::from_str(r#"{"ssid":"home","password":"pw"}"#).unwrap();
        assert_eq!(creds.auth_mode(), AuthMode::WPA2_AES_PSK);

        let err = serde_json::from_str::<NetworkCredentials>(r#"{"ssid":""}"#);
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        let creds = NetworkCredentials::new("home", "pw", AuthMode(7)).unwrap();
        store.store(creds.clone()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(creds));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}
