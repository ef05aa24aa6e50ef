//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::history::HistoryConfig;
use super::limits::LimitsConfig;
use super::listen::ListenConfig;
use super::validation::{ValidationError, validate};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", format_validation(.0))]
    Invalid(Vec<ValidationError>),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Hub configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server information.
    #[serde(default)]
    pub server: ServerConfig,
    /// WebSocket listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Admission and queue limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Session log persistence.
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Override the listen port, keeping the bind host.
    pub fn with_port(mut self, port: u16) -> Self {
        self.listen.address.set_port(port);
        self
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name, used in logs.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Prometheus metrics HTTP port. 0 disables the endpoint.
    #[serde(default)]
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            metrics_port: 0,
        }
    }
}

fn default_server_name() -> String {
    "broadcast-hub".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_proto::RecordFormat;

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.name, "broadcast-hub");
        assert_eq!(config.listen.address.port(), 8080);
        assert_eq!(config.listen.path, "/ws");
        assert_eq!(config.limits.max_clients, 100);
        assert_eq!(config.history.path, "MessageHistory.txt");
        assert_eq!(config.history.format, RecordFormat::Plain);
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::from_toml(
            r#"
[server]
name = "hub.test"
metrics_port = 9191

[listen]
address = "127.0.0.1:9000"
path = "/chat"

[limits]
max_clients = 2
inbound_queue_capacity = 8

[history]
path = "/tmp/hub.log"
format = "jsonl"
"#,
        )
        .unwrap();

        assert_eq!(config.server.metrics_port, 9191);
        assert_eq!(config.listen.address.to_string(), "127.0.0.1:9000");
        assert_eq!(config.listen.path, "/chat");
        assert_eq!(config.limits.max_clients, 2);
        assert_eq!(config.limits.inbound_queue_capacity, 8);
        assert_eq!(config.history.format, RecordFormat::JsonLines);
    }

    #[test]
    fn port_override_keeps_host() {
        let config = Config::from_toml("[listen]\naddress = \"127.0.0.1:9000\"")
            .unwrap()
            .with_port(7001);
        assert_eq!(config.listen.address.to_string(), "127.0.0.1:7001");
    }

    #[test]
    fn invalid_values_are_reported_together() {
        let err = Config::from_toml("[limits]\nmax_clients = 0\ninbound_queue_capacity = 0")
            .unwrap_err();
        match err {
            ConfigError::Invalid(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            Config::from_toml("[limits\nmax_clients = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
