//! Runs the bench controller on a desktop host.
//!
//! ```text
//! benchlink [config.json]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::sync::Arc;
use std::time::Duration;

use benchlink::prelude::*;
use tracing::info;
use tracing_subscriber::fmt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const INDICATOR_PERIOD: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), BenchlinkError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading config");
            ControllerConfig::load(&path)?
        }
        None => ControllerConfig::default(),
    };

    let store = match config.credentials.clone() {
        Some(credentials) => MemoryCredentialStore::with_credentials(credentials),
        None => MemoryCredentialStore::new(),
    };
    let controller = Controller::builder()
        .config(&config)
        .build(HostRadio::new(), LoggingServices, store)?;

    tokio::spawn(run_indicator(
        StatusIndicator::new(controller.status()),
        LogSink::default(),
        INDICATOR_PERIOD,
    ));

    tokio::spawn(log_infos(Arc::clone(controller.shared())));

    let mut mirror = controller.shared().mirror.subscribe();
    tokio::spawn(async move {
        while mirror.changed().await.is_ok() {
            let status = *mirror.borrow_and_update();
            info!(%status, "compressor status");
        }
    });

    controller
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "could not listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("bench controller stopped");
    Ok(())
}
