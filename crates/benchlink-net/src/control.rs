//! How the network manager drives the message server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use benchlink_protocol::Codec;
use benchlink_server::{MessageServer, ServerError};

/// The subset of [`MessageServer`] the manager needs.
///
/// A listener failure inside `start` is expected to raise
/// `SOCKET_SERVER_FAILED` on the shared signal set, as `MessageServer`
/// does.
pub trait ServerControl: Send + Sync + 'static {
    fn start(&self) -> Result<SocketAddr, ServerError>;

    fn stop(&self) -> impl Future<Output = ()> + Send;

    fn is_running(&self) -> bool;

    /// TCP port to advertise.
    fn port(&self) -> u16;
}

impl<C: Codec> ServerControl for MessageServer<C> {
    fn start(&self) -> Result<SocketAddr, ServerError> {
        MessageServer::start(self)
    }

    fn stop(&self) -> impl Future<Output = ()> + Send {
        MessageServer::stop(self)
    }

    fn is_running(&self) -> bool {
        MessageServer::is_running(self)
    }

    fn port(&self) -> u16 {
        MessageServer::port(self)
    }
}

impl<T: ServerControl> ServerControl for Arc<T> {
    fn start(&self) -> Result<SocketAddr, ServerError> {
        (**self).start()
    }

    fn stop(&self) -> impl Future<Output = ()> + Send {
        (**self).stop()
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }

    fn port(&self) -> u16 {
        (**self).port()
    }
}
