//! Error types for the network layer.
//!
//! The collaborators behind the [`Radio`](crate::Radio),
//! [`LocalServices`](crate::LocalServices) and
//! [`CredentialStore`](crate::CredentialStore) traits each get their own
//! error enum. [`NetError`] wraps the two that can abort a manager
//! handler; credential and server failures are logged where they happen
//! and never unwind a handler.

/// Failures reported by the radio driver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RadioError {
    /// The connection attempt did not finish within its timeout.
    #[error("connection attempt timed out")]
    Timeout,

    /// The access point rejected our credentials.
    #[error("authentication rejected")]
    AuthFailed,

    /// No network with the requested SSID is in range.
    #[error("network not found")]
    NoNetwork,

    /// Anything else the driver reports.
    #[error("radio error: {0}")]
    Driver(String),
}

/// Failures from the provisioning surface or the service advertiser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{what} failed: {reason}")]
pub struct ServiceError {
    pub what: &'static str,
    pub reason: String,
}

/// Invalid credentials, or a store that could not be read or written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("SSID is empty")]
    EmptySsid,

    #[error("SSID is {len} bytes (max {max})")]
    SsidTooLong { len: usize, max: usize },

    #[error("password is {len} bytes (max {max})")]
    PasswordTooLong { len: usize, max: usize },

    #[error("credential store: {0}")]
    Store(String),
}

/// Errors surfaced by the network manager's handlers.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error(transparent)]
    Radio(#[from] RadioError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails_with_radio() -> Result<(), NetError> {
        Err(RadioError::NoNetwork)?
    }

    #[test]
    fn test_collaborator_errors_convert_transparently() {
        let err = fails_with_radio().unwrap_err();
        assert!(matches!(err, NetError::Radio(RadioError::NoNetwork)));
        assert_eq!(err.to_string(), "network not found");

        let err = NetError::from(ServiceError {
            what: "provisioning",
            reason: "portal busy".into(),
        });
        assert!(matches!(err, NetError::Service(_)));
        assert_eq!(err.to_string(), "provisioning failed: portal busy");
    }
}
