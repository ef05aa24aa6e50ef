//! Session log record codec.
//!
//! A persisted session log holds one record per line. Two encodings exist:
//!
//! - [`RecordFormat::Plain`]: `<identity>: <text>`, byte-for-byte the format
//!   peers see on the wire. Embedded newlines are written as-is, so a plain
//!   log cannot always be split back into records.
//! - [`RecordFormat::JsonLines`]: one JSON object per line. Newlines and
//!   separators inside the text are escaped, so every line decodes back to
//!   exactly one record.

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Separator between identity and text in the plain encoding.
pub const PLAIN_SEPARATOR: &str = ": ";

/// A single broadcast message as it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Sender identity, e.g. `client3`.
    pub identity: String,
    /// Original message text.
    pub text: String,
}

impl LogRecord {
    /// Create a record from an identity and text.
    pub fn new(identity: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            text: text.into(),
        }
    }
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.identity, PLAIN_SEPARATOR, self.text)
    }
}

/// On-disk encoding of the session log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// `<identity>: <text>` per line, no escaping.
    #[default]
    Plain,
    /// One JSON object per line.
    #[serde(rename = "jsonl")]
    JsonLines,
}

impl RecordFormat {
    /// Encode a record as a single line, without the trailing newline.
    pub fn encode(&self, record: &LogRecord) -> Result<String, RecordError> {
        match self {
            Self::Plain => Ok(record.to_string()),
            Self::JsonLines => Ok(serde_json::to_string(record)?),
        }
    }

    /// Decode one line (trailing `\n` / `\r\n` tolerated).
    ///
    /// Plain lines split at the first separator; `client<N>` identities never
    /// contain one, so the text keeps any later `": "` intact.
    pub fn decode(&self, line: &str) -> Result<LogRecord, RecordError> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        match self {
            Self::Plain => line
                .split_once(PLAIN_SEPARATOR)
                .map(|(identity, text)| LogRecord::new(identity, text))
                .ok_or_else(|| RecordError::MissingSeparator(line.to_string())),
            Self::JsonLines => Ok(serde_json::from_str(line)?),
        }
    }
}
