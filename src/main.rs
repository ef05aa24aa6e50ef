//! broadcast-hub - fan-out text relay over WebSocket.

use broadcast_hub::cli::{Cli, Commands};
use broadcast_hub::config::Config;
use broadcast_hub::{Server, client, telemetry};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Used when `--config` is not given; missing is not an error.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.json_logs);

    match cli.command {
        Commands::Start { port, config } => start(port, config).await,
        Commands::Connect { host, port, path } => {
            client::connect(&host, port, &path).await?;
            Ok(())
        }
    }
}

async fn start(port: Option<u16>, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let config = match port {
        Some(port) => config.with_port(port),
        None => config,
    };

    let server = Server::start(config).await.map_err(|e| {
        error!(error = %e, "Failed to start server");
        e
    })?;

    let report = server.wait().await;
    if let Some(e) = &report.persistence_error {
        warn!(error = %e, "Message history was not saved");
    }
    info!(
        persisted = report.persisted,
        notified = report.notified,
        broadcasts = report.fanout.messages,
        voluntary_disconnects = report.voluntary_disconnects,
        abnormal_disconnects = report.abnormal_disconnects,
        "Shutdown complete"
    );
    Ok(())
}

fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => Config::load(&path).map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to load config");
            e.into()
        }),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if path.exists() {
                info!(path = %path.display(), "Loading config");
                Ok(Config::load(&path)?)
            } else {
                info!("No config file, using defaults");
                Ok(Config::default())
            }
        }
    }
}
