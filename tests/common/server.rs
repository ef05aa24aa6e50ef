//! Test server management.
//!
//! Runs broadcast-hub instances in-process on ephemeral ports. Each server
//! has its own hub and its own temporary history file.

use broadcast_hub::config::Config;
use broadcast_hub::network::ShutdownReport;
use broadcast_hub::{Hub, Server};
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// A test server instance.
pub struct TestServer {
    server: Option<Server>,
    hub: Arc<Hub>,
    addr: SocketAddr,
    history_path: PathBuf,
    _data_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Spawn a server admitting at most `max_clients` peers.
    pub async fn spawn(max_clients: usize) -> anyhow::Result<Self> {
        Self::spawn_with(|config| config.limits.max_clients = max_clients).await
    }

    /// Spawn a server after adjusting the default test configuration.
    pub async fn spawn_with(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let history_path = data_dir.path().join("MessageHistory.txt");

        let mut config = Config::from_toml(&format!(
            r#"
[server]
name = "test.hub"

[listen]
address = "127.0.0.1:0"

[limits]
write_timeout_ms = 1000

[history]
path = "{}"
"#,
            history_path.display()
        ))?;
        configure(&mut config);

        let server = Server::start(config).await?;
        Ok(Self {
            hub: Arc::clone(server.hub()),
            addr: server.local_addr(),
            server: Some(server),
            history_path,
            _data_dir: data_dir,
        })
    }

    /// WebSocket URL for the default path.
    pub fn url(&self) -> String {
        self.url_for("/ws")
    }

    /// WebSocket URL for an arbitrary path.
    pub fn url_for(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    /// Address of the WebSocket listener.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    /// Connect a client and wait until the hub has registered it.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        let before = self.hub.stats.admitted();
        let client = super::client::TestClient::connect(&self.url()).await?;
        self.wait_until(|| async move { self.hub.stats.admitted() > before }).await?;
        Ok(client)
    }

    /// Poll `condition` until it holds, for at most five seconds.
    pub async fn wait_until<F, Fut>(&self, mut condition: F) -> anyhow::Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        for _ in 0..100 {
            if condition().await {
                return Ok(());
            }
            sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("condition not reached within 5 seconds")
    }

    /// Wait until exactly `count` peers are registered.
    pub async fn wait_for_peers(&self, count: usize) -> anyhow::Result<()> {
        self.wait_until(|| async move { self.hub.registry.len().await == count })
            .await
    }

    /// Trigger shutdown and wait for the report.
    pub async fn shutdown(&mut self) -> anyhow::Result<ShutdownReport> {
        let server = self
            .server
            .take()
            .ok_or_else(|| anyhow::anyhow!("server already shut down"))?;
        Ok(tokio::time::timeout(Duration::from_secs(10), server.shutdown()).await?)
    }

    /// Contents of the history file written at shutdown.
    pub fn history(&self) -> anyhow::Result<String> {
        Ok(std::fs::read_to_string(&self.history_path)?)
    }
}
