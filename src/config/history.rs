//! Session log persistence configuration.

use hub_proto::RecordFormat;
use serde::Deserialize;

/// Session log persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Whether the session log is written at shutdown.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// File overwritten at every shutdown.
    #[serde(default = "default_history_path")]
    pub path: String,
    /// Line encoding: "plain" or "jsonl".
    #[serde(default)]
    pub format: RecordFormat,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_history_path(),
            format: RecordFormat::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_history_path() -> String {
    "MessageHistory.txt".to_string()
}
