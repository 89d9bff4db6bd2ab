//! Pending network signals.
//!
//! The network manager sleeps until one or more of five named events are
//! raised, then services every pending one in a fixed priority order. A
//! signal is a flag, not a queue entry: raising one that is already
//! pending does nothing, so a burst of identical failures collapses into a
//! single service.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::Notify;
use tracing::trace;

/// An event the network manager reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NetworkSignal {
    Startup = 1 << 0,
    WifiConnectionFailed = 1 << 1,
    Configured = 1 << 2,
    WifiConnected = 1 << 3,
    SocketServerFailed = 1 << 4,
}

impl NetworkSignal {
    /// Service order, highest priority first.
    pub const PRIORITY: [NetworkSignal; 5] = [
        Self::Startup,
        Self::WifiConnectionFailed,
        Self::Configured,
        Self::WifiConnected,
        Self::SocketServerFailed,
    ];

    fn bit(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "STARTUP",
            Self::WifiConnectionFailed => "WIFI_CONNECTION_FAILED",
            Self::Configured => "CONFIGURED",
            Self::WifiConnected => "WIFI_CONNECTED",
            Self::SocketServerFailed => "SOCKET_SERVER_FAILED",
        }
    }
}

impl fmt::Display for NetworkSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of signals taken from a [`SignalSet`] in one go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingSignals(u8);

impl PendingSignals {
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, signal: NetworkSignal) -> bool {
        self.0 & signal.bit() != 0
    }

    /// The contained signals in priority order.
    pub fn iter(&self) -> impl Iterator<Item = NetworkSignal> + '_ {
        NetworkSignal::PRIORITY
            .into_iter()
            .filter(|s| self.contains(*s))
    }
}

/// Lock-free set of pending [`NetworkSignal`]s with an async wake-up.
///
/// `raise` is a single atomic OR plus a `Notify`; it never blocks and
/// never allocates, so any task or callback may call it.
#[derive(Debug, Default)]
pub struct SignalSet {
    bits: AtomicU8,
    notify: Notify,
}

impl SignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `signal` pending. Returns `false` if it already was.
    pub fn raise(&self, signal: NetworkSignal) -> bool {
        let prev = self.bits.fetch_or(signal.bit(), Ordering::AcqRel);
        let newly = prev & signal.bit() == 0;
        if newly {
            trace!(signal = %signal, "signal raised");
            self.notify.notify_one();
        }
        newly
    }

    pub fn is_pending(&self, signal: NetworkSignal) -> bool {
        self.bits.load(Ordering::Acquire) & signal.bit() != 0
    }

    /// Atomically takes and clears everything pending.
    pub fn take(&self) -> PendingSignals {
        PendingSignals(self.bits.swap(0, Ordering::AcqRel))
    }

    /// Waits until at least one signal is pending, then takes them all.
    pub async fn wait(&self) -> PendingSignals {
        loop {
            // Register interest before checking, so a raise that lands
            // between the check and the await still wakes us.
            let notified = self.notify.notified();
            let pending = self.take();
            if !pending.is_empty() {
                return pending;
            }
            notified.await;
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    #[test]
    fn test_raise_is_idempotent() {
        let set = SignalSet::new();
        assert!(set.raise(NetworkSignal::Configured));
        assert!(!set.raise(NetworkSignal::Configured));

        let taken = set.take();
        assert_eq!(taken.iter().collect::<Vec<_>>(), vec![NetworkSignal::Configured]);
        assert!(set.take().is_empty());
    }

    #[test]
    fn test_iter_is_priority_ordered() {
        let set = SignalSet::new();
        set.raise(NetworkSignal::SocketServerFailed);
        set.raise(NetworkSignal::WifiConnected);
        set.raise(NetworkSignal::Startup);

        let order: Vec<_> = set.take().iter().collect();
        assert_eq!(
            order,
            vec![
                NetworkSignal::Startup,
                NetworkSignal::WifiConnected,
                NetworkSignal::SocketServerFailed,
            ]
        );
    }

    #[test]
    fn test_is_pending_does_not_clear() {
        let set = SignalSet::new();
        set.raise(NetworkSignal::WifiConnectionFailed);
        assert!(set.is_pending(NetworkSignal::WifiConnectionFailed));
        assert!(set.is_pending(NetworkSignal::WifiConnectionFailed));
        assert!(!set.is_pending(NetworkSignal::Startup));
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_pending() {
        let set = SignalSet::new();
        set.raise(NetworkSignal::Startup);
        let pending = set.wait().await;
        assert!(pending.contains(NetworkSignal::Startup));
    }

    #[tokio::test]
    async fn test_wait_wakes_on_raise_from_other_task() {
        let set = Arc::new(SignalSet::new());
        let waiter = {
            let set = Arc::clone(&set);
            tokio::spawn(async move { set.wait().await })
        };
        tokio::task::yield_now().await;
        set.raise(NetworkSignal::WifiConnected);

        let pending = waiter.await.unwrap();
        assert!(pending.contains(NetworkSignal::WifiConnected));
        assert!(set.take().is_empty());
    }
}
