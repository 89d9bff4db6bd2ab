//! One peer connection, from accept to disconnect.
//!
//! Each pass of the session loop:
//!
//! 1. reads whatever bytes have arrived (never waits for them),
//! 2. cuts them into lines and decodes each one,
//! 3. drains the outbound command queue onto the socket,
//! 4. waits for more input, a new command, the poll interval, or shutdown.
//!
//! Writes never wait either. A peer that stops reading fills the socket's
//! send buffer, and the first write that would block ends the connection.

use std::fmt;
use std::io;

use benchlink_protocol::{Codec, Command, LineBuffer, Message, ProtocolError};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::server::ServerContext;
use crate::{ConnectionId, ServerError};

/// Why a session ended without an I/O error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The peer closed the connection (zero-byte read).
    PeerClosed,
    /// The server is stopping.
    Shutdown,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerClosed => f.write_str("peer closed"),
            Self::Shutdown => f.write_str("server shutdown"),
        }
    }
}

pub(crate) struct Session<'a, C: Codec> {
    id: ConnectionId,
    stream: TcpStream,
    ctx: &'a ServerContext<C>,
    lines: LineBuffer,
    read_buf: Vec<u8>,
}

impl<'a, C: Codec> Session<'a, C> {
    pub(crate) fn new(
        id: ConnectionId,
        stream: TcpStream,
        ctx: &'a ServerContext<C>,
    ) -> Self {
        Self {
            id,
            stream,
            ctx,
            lines: LineBuffer::new(ctx.config.max_line_len),
            read_buf: vec![0; ctx.config.read_chunk],
        }
    }

    /// Runs the connection until the peer leaves, an I/O error occurs, or
    /// `shutdown` flips.
    pub(crate) async fn run(
        mut self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<SessionEnd, ServerError> {
        let ctx = self.ctx;
        let shared = &ctx.shared;

        // Anything queued for the previous peer is stale.
        let stale = shared.commands.flush() + shared.infos.flush();
        if stale > 0 {
            debug!(id = %self.id, stale, "discarded queued messages from previous session");
        }
        if let Err(e) = shared.commands.request_status() {
            warn!(id = %self.id, error = %e, "could not queue initial status request");
        }
        shared.set_peer_connected(true);

        let poll = ctx.config.poll_interval();
        loop {
            if *shutdown.borrow() {
                return Ok(SessionEnd::Shutdown);
            }

            if let Some(end) = self.read_available()? {
                return Ok(end);
            }
            self.drain_outbound()?;

            tokio::select! {
                _ = shutdown.changed() => return Ok(SessionEnd::Shutdown),
                _ = self.stream.readable() => {}
                cmd = shared.commands.recv() => self.send_command(cmd)?,
                _ = tokio::time::sleep(poll) => {}
            }
        }
    }

    /// One non-blocking read. `Some(PeerClosed)` on EOF.
    fn read_available(&mut self) -> Result<Option<SessionEnd>, ServerError> {
        let n = match self.stream.try_read(&mut self.read_buf) {
            Ok(0) => return Ok(Some(SessionEnd::PeerClosed)),
            Ok(n) => n,
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                return Ok(None);
            }
            Err(e) => return Err(ServerError::Receive(e)),
        };

        trace!(id = %self.id, bytes = n, "read");
        let results = self.lines.push(&self.read_buf[..n]);
        for line in results {
            self.handle_line(line);
        }
        Ok(None)
    }

    fn handle_line(&self, line: Result<Vec<u8>, ProtocolError>) {
        let id = self.id;
        let bytes = match line {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%id, error = %e, "dropping oversized line");
                return;
            }
        };

        match self.ctx.codec.decode_slice(&bytes) {
            Ok(Message::Info(info)) => {
                trace!(%id, info = %info.info_type(), "received");
                self.ctx.shared.mirror.apply(&info);
                if let Err(e) = self.ctx.shared.infos.try_send(info) {
                    debug!(%id, error = %e, info = %info.info_type(), "info not forwarded");
                }
            }
            Ok(Message::Command(cmd)) => {
                let e = ProtocolError::InvalidMessage(format!(
                    "peer sent command {}",
                    cmd.command_type()
                ));
                warn!(%id, error = %e, "discarding command from peer");
            }
            Err(e) => {
                warn!(
                    %id,
                    error = %e,
                    line = %String::from_utf8_lossy(&bytes),
                    "dropping undecodable line"
                );
            }
        }
    }

    /// Writes every queued command, one line each.
    fn drain_outbound(&self) -> Result<(), ServerError> {
        while let Some(cmd) = self.ctx.shared.commands.try_recv() {
            self.send_command(cmd)?;
        }
        Ok(())
    }

    fn send_command(&self, cmd: Command) -> Result<(), ServerError> {
        let line = match self.ctx.codec.encode_line(&Message::Command(cmd)) {
            Ok(line) => line,
            Err(e) => {
                warn!(id = %self.id, error = %e, "dropping unencodable command");
                return Ok(());
            }
        };
        self.write_now(line.as_bytes())?;
        debug!(id = %self.id, command = %cmd.command_type(), "sent");
        Ok(())
    }

    /// Writes all of `bytes` without waiting for the peer.
    fn write_now(&self, mut bytes: &[u8]) -> Result<(), ServerError> {
        while !bytes.is_empty() {
            match self.stream.try_write(bytes) {
                Ok(0) => return Err(ServerError::Send(io::ErrorKind::WriteZero.into())),
                Ok(n) => bytes = &bytes[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    warn!(id = %self.id, pending = bytes.len(), "peer is not reading");
                    return Err(ServerError::Send(e));
                }
                Err(e) => return Err(ServerError::Send(e)),
            }
        }
        Ok(())
    }
}
