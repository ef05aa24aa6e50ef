//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the WebSocket broadcast server
    Start {
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Connect to a server as an interactive peer
    Connect {
        /// Server hostname
        #[arg(long, default_value = "localhost")]
        host: String,
        /// Server port
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
        /// WebSocket path
        #[arg(long, default_value = "/ws")]
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_defaults_to_localhost_8080() {
        let cli = Cli::parse_from(["broadcast-hub", "connect"]);
        match cli.command {
            Commands::Connect { host, port, path } => {
                assert_eq!(host, "localhost");
                assert_eq!(port, 8080);
                assert_eq!(path, "/ws");
            }
            Commands::Start { .. } => panic!("expected connect"),
        }
    }

    #[test]
    fn start_accepts_port_and_config() {
        let cli = Cli::parse_from(["broadcast-hub", "start", "--port", "9001", "--config", "hub.toml"]);
        match cli.command {
            Commands::Start { port, config } => {
                assert_eq!(port, Some(9001));
                assert_eq!(config, Some(PathBuf::from("hub.toml")));
            }
            Commands::Connect { .. } => panic!("expected start"),
        }
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["broadcast-hub", "serve"]).is_err());
    }
}
