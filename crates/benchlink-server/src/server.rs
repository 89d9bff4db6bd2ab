//! `MessageServer` lifecycle and accept loop.
//!
//! The server owns at most one listening socket and serves at most one
//! peer at a time. A second compressor that connects while a session is
//! active waits in the (single-slot) backlog until the first one leaves.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use benchlink_protocol::{Codec, JsonCodec};
use benchlink_state::{NetworkSignal, SharedState};
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::session::{Session, SessionEnd};
use crate::{ConnectionId, ServerConfig, ServerError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Everything the accept loop and its sessions need.
pub(crate) struct ServerContext<C: Codec> {
    pub(crate) shared: Arc<SharedState>,
    pub(crate) config: ServerConfig,
    pub(crate) codec: C,
}

struct RunningServer {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// TCP server speaking the line-delimited JSON protocol to one peer.
///
/// `start` and `stop` may be called any number of times; starting a
/// running server or stopping a stopped one does nothing.
///
/// # Example
///
/// ```rust,ignore
/// let shared = Arc::new(SharedState::new());
/// let server = MessageServer::new(Arc::clone(&shared), ServerConfig::default());
/// let addr = server.start()?;
/// // ... later
/// server.stop().await;
/// ```
pub struct MessageServer<C: Codec = JsonCodec> {
    ctx: Arc<ServerContext<C>>,
    running: Mutex<Option<RunningServer>>,
}

impl MessageServer<JsonCodec> {
    /// Creates a stopped server using the JSON codec.
    pub fn new(shared: Arc<SharedState>, config: ServerConfig) -> Self {
        Self::with_codec(shared, config, JsonCodec)
    }
}

impl<C: Codec> MessageServer<C> {
    pub fn with_codec(shared: Arc<SharedState>, config: ServerConfig, codec: C) -> Self {
        Self {
            ctx: Arc::new(ServerContext {
                shared,
                config: config.validated(),
                codec,
            }),
            running: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.ctx.config
    }

    /// Address the listener is bound to, while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock().as_ref().map(|r| r.local_addr)
    }

    /// Port peers should connect to: the bound port while running,
    /// otherwise the configured one.
    pub fn port(&self) -> u16 {
        self.local_addr()
            .map(|addr| addr.port())
            .or_else(|| {
                self.ctx
                    .config
                    .bind_addr
                    .parse::<SocketAddr>()
                    .ok()
                    .map(|addr| addr.port())
            })
            .unwrap_or(ServerConfig::DEFAULT_PORT)
    }

    pub fn is_running(&self) -> bool {
        self.lock().as_ref().is_some_and(|r| !r.task.is_finished())
    }

    /// Binds the listener and spawns the accept loop.
    ///
    /// Must be called from within a Tokio runtime. Returns the bound
    /// address (useful when the config asks for port 0).
    ///
    /// # Errors
    /// If the listener cannot be created, `SOCKET_SERVER_FAILED` is raised
    /// on the shared signal set and the error is returned. No loop runs.
    pub fn start(&self) -> Result<SocketAddr, ServerError> {
        let mut running = self.lock();
        if let Some(current) = running.as_ref() {
            if !current.task.is_finished() {
                debug!(addr = %current.local_addr, "message server already running");
                return Ok(current.local_addr);
            }
        }

        let (listener, local_addr) = match self.listen() {
            Ok(bound) => bound,
            Err(e) => {
                error!(addr = %self.ctx.config.bind_addr, error = %e, "message server failed to start");
                self.ctx.shared.raise(NetworkSignal::SocketServerFailed);
                return Err(e);
            }
        };

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(accept_loop(listener, Arc::clone(&self.ctx), shutdown_rx));

        info!(addr = %local_addr, "message server listening");
        *running = Some(RunningServer {
            local_addr,
            shutdown,
            task,
        });
        Ok(local_addr)
    }

    /// Signals the accept loop to unwind and waits for it.
    ///
    /// Any active session is closed. Does not raise a network signal.
    pub async fn stop(&self) {
        let running = self.lock().take();
        let Some(running) = running else {
            return;
        };

        let _ = running.shutdown.send(true);
        if let Err(e) = running.task.await {
            warn!(error = %e, "accept loop ended abnormally");
        }
        self.ctx.shared.set_peer_connected(false);
        info!(addr = %running.local_addr, "message server stopped");
    }

    fn listen(&self) -> Result<(TcpListener, SocketAddr), ServerError> {
        let addr_str = &self.ctx.config.bind_addr;
        let addr: SocketAddr =
            addr_str
                .parse()
                .map_err(|source| ServerError::InvalidAddress {
                    addr: addr_str.clone(),
                    source,
                })?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(ServerError::Bind)?;
        socket.set_reuseaddr(true).map_err(ServerError::Bind)?;
        socket.bind(addr).map_err(ServerError::Bind)?;

        // Backlog of one: a single compressor is all we ever serve.
        let listener = socket.listen(1).map_err(ServerError::Listen)?;
        let local_addr = listener.local_addr().map_err(ServerError::Listen)?;
        Ok((listener, local_addr))
    }

    fn lock(&self) -> MutexGuard<'_, Option<RunningServer>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn accept_loop<C: Codec>(
    listener: TcpListener,
    ctx: Arc<ServerContext<C>>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let accepted = tokio::select! {
            _ = shutdown.changed() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, addr)) => {
                let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
                info!(%id, %addr, "peer connected");

                let outcome = Session::new(id, stream, &ctx).run(&mut shutdown).await;
                ctx.shared.set_peer_connected(false);

                match outcome {
                    Ok(SessionEnd::Shutdown) => {
                        info!(%id, "peer disconnected: server shutdown");
                        break;
                    }
                    Ok(end) => info!(%id, reason = %end, "peer disconnected"),
                    Err(e) => warn!(%id, error = %e, "peer connection dropped"),
                }
            }
            Err(e) => {
                let e = ServerError::Accept(e);
                warn!(error = %e, "retrying accept after pause");
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(ctx.config.accept_retry()) => {}
                }
            }
        }
    }
    debug!("accept loop stopped");
}
