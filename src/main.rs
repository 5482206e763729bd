//! Nuntius — binary entrypoint.
//! Loads configuration, installs logging and signal handlers, then runs the relay
//! loop until SIGINT/SIGTERM.

use std::process::ExitCode;
use std::sync::Arc;

use nuntius::config::{self, AppConfig};
use nuntius::shutdown::spawn_signal_listener;
use nuntius::{logging, GNewsClient, Relay, RelaySettings, Shutdown, TelegramDelivery};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let path = config::config_path_default();
    let cfg = match config::load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("configuration error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&cfg) {
        eprintln!("logging setup failed: {e:#}");
        return ExitCode::FAILURE;
    }

    info!(app = %cfg.app_name, version = %cfg.app_version, " >>> Starting service...");

    match run(cfg).await {
        Ok(()) => {
            warn!(" <<< Quitting service");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let source = GNewsClient::from_config(&cfg)?;
    let delivery = TelegramDelivery::from_config(&cfg);

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let relay = Relay::new(
        RelaySettings::from_config(&cfg),
        Arc::new(source),
        Arc::new(delivery),
        shutdown,
    );
    let cycles = relay.run().await;
    info!(cycles, "relay stopped");
    Ok(())
}
