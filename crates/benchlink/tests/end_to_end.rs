//! End-to-end tests: a full controller on the host radio, with a plain
//! Tokio TCP client standing in for the compressor node.

use std::sync::Arc;
use std::time::Duration;

use benchlink::prelude::*;
use benchlink::net::AuthMode;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::oneshot;

const GET_STATUS: &str = r#"{"messageType":"COMMAND","commandType":"GET_STATUS"}"#;
const ON: &str = r#"{"messageType":"COMMAND","commandType":"ON"}"#;

// =========================================================================
// Helpers
// =========================================================================

struct Running {
    shared: Arc<SharedState>,
    status: NetworkStatus,
    server: Arc<benchlink::server::MessageServer>,
    stop: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl Running {
    async fn boot() -> Self {
        let credentials = NetworkCredentials::new("lab", "hunter22", AuthMode::WPA2_AES_PSK).unwrap();
        let controller = Controller::builder()
            .server_config(ServerConfig {
                poll_interval_ms: 10,
                ..ServerConfig::with_bind_addr("127.0.0.1:0")
            })
            .network_config(NetworkConfig::default())
            .build(
                HostRadio::new(),
                LoggingServices,
                MemoryCredentialStore::with_credentials(credentials),
            )
            .unwrap();

        let shared = Arc::clone(controller.shared());
        let status = controller.status();
        let server = Arc::clone(controller.server());
        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(controller.run_until(async {
            let _ = stopped.await;
        }));

        let probe = Arc::clone(&server);
        wait_until("server to start", move || probe.local_addr().is_some()).await;

        Self {
            shared,
            status,
            server,
            stop,
            task,
        }
    }

    async fn shutdown(self) {
        let _ = self.stop.send(());
        self.task.await.unwrap();
        assert!(!self.server.is_running());
    }
}

struct Peer {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Peer {
    async fn connect(running: &Running) -> Self {
        let addr = running.server.local_addr().expect("server should be running");
        let stream = TcpStream::connect(addr).await.expect("client should connect");
        let (read, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read),
            writer,
        }
    }

    async fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        let n = tokio::time::timeout(Duration::from_secs(2), self.reader.read_line(&mut line))
            .await
            .expect("controller should answer within 2s")
            .expect("read should succeed");
        (n > 0).then(|| line.trim_end_matches('\n').to_string())
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }
}

async fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_status_update_then_turned_on_reaches_mirror() {
    let running = Running::boot().await;
    assert_eq!(running.status.state(), NetworkState::Connected);

    let mut peer = Peer::connect(&running).await;
    assert_eq!(peer.read_line().await.as_deref(), Some(GET_STATUS));

    peer.send(ON).await;
    peer.send(
        r#"{"messageType":"INFO","infoType":"STATUS_UPDATE","pressure":101.3,"temperature":25.6,"compressorOn":false,"motorRunning":false,"airbrushInUse":true,"compressionTimerDuration":10,"compressionTimeLeft":1,"motorTimerDuration":5,"motorTimeLeft":1,"releaseTimerDuration":8,"releaseTimeLeft":1}"#,
    )
    .await;
    peer.send(r#"{"messageType":"INFO","infoType":"TURNED_ON"}"#).await;

    let shared = Arc::clone(&running.shared);
    wait_until("compressor to read on", move || shared.mirror.snapshot().compressor_on).await;

    let status = running.shared.mirror.snapshot();
    assert_eq!(status.pressure, 101.3);
    assert!(status.airbrush_in_use);
    assert_eq!(status.motor_timer_duration, 5);
    assert_eq!(running.status.phase(), NetworkPhase::ConnectedActive);

    running.shutdown().await;
}

#[tokio::test]
async fn test_ui_commands_reach_compressor() {
    let running = Running::boot().await;
    let mut peer = Peer::connect(&running).await;
    assert_eq!(peer.read_line().await.as_deref(), Some(GET_STATUS));

    running.shared.commands.send_on().unwrap();
    running.shared.commands.set_motor_timeout(5).unwrap();

    assert_eq!(peer.read_line().await.as_deref(), Some(ON));
    assert_eq!(
        peer.read_line().await.as_deref(),
        Some(r#"{"messageType":"COMMAND","commandType":"SET_MOTOR_TIMEOUT","timeout":5}"#)
    );

    running.shutdown().await;
}

#[tokio::test]
async fn test_peer_disconnect_keeps_network_connected() {
    let running = Running::boot().await;
    let peer = Peer::connect(&running).await;
    let shared = Arc::clone(&running.shared);
    wait_until("peer to register", move || shared.peer_connected()).await;

    drop(peer);
    let shared = Arc::clone(&running.shared);
    wait_until("peer to leave", move || !shared.peer_connected()).await;

    assert_eq!(running.status.phase(), NetworkPhase::ConnectedIdle);
    assert!(running.server.is_running());
    assert!(!running.shared.signals.is_pending(NetworkSignal::SocketServerFailed));

    running.shutdown().await;
}

#[test]
fn test_bad_bind_address_fails_build() {
    let result = Controller::builder().bind("bench:3000").build(
        HostRadio::new(),
        LoggingServices,
        MemoryCredentialStore::new(),
    );
    assert!(matches!(
        result,
        Err(BenchlinkError::Server(benchlink::server::ServerError::InvalidAddress { .. }))
    ));
}

#[test]
fn test_config_document_fills_defaults() {
    let config = ControllerConfig::from_json(
        r#"{
            "server": { "bind_addr": "127.0.0.1:4000" },
            "network": { "backoff_reset_after_ms": null },
            "credentials": { "ssid": "lab", "password": "hunter22" }
        }"#,
    )
    .unwrap();

    assert_eq!(config.server.bind_addr, "127.0.0.1:4000");
    assert_eq!(config.server.poll_interval_ms, 100);
    assert_eq!(config.network.backoff_reset_after_ms, None);
    assert_eq!(config.network.connect_retries, 3);
    let credentials = config.credentials.unwrap();
    assert_eq!(credentials.ssid(), "lab");
    assert_eq!(credentials.auth_mode(), AuthMode::WPA2_AES_PSK);
}

#[test]
fn test_config_rejects_oversized_ssid() {
    let long = "x".repeat(40);
    let err = ControllerConfig::from_json(&format!(r#"{{"credentials":{{"ssid":"{long}","password":"p"}}}}"#))
        .unwrap_err();
    assert!(matches!(err, BenchlinkError::Config(_)));
}
