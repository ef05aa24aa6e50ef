//! File-backed history sink.
//!
//! Creates or truncates one file per run and writes one record per line.

use super::{HistoryError, HistorySink, LogEntry};
use crate::config::HistoryConfig;
use async_trait::async_trait;
use hub_proto::RecordFormat;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

/// Writes the session log to a single file.
pub struct FileSink {
    path: PathBuf,
    format: RecordFormat,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, format: RecordFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(&config.path, config.format)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistorySink for FileSink {
    async fn persist(&self, entries: &[LogEntry]) -> Result<usize, HistoryError> {
        let file = File::create(&self.path).await?;
        let mut writer = BufWriter::new(file);

        for entry in entries {
            let mut line = self.format.encode(&entry.to_record())?;
            line.push('\n');
            writer.write_all(line.as_bytes()).await?;
        }

        writer.flush().await?;
        writer.get_ref().sync_all().await?;
        debug!(path = %self.path.display(), count = entries.len(), "Session log written");
        Ok(entries.len())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(lines: &[(&str, &str)]) -> Vec<LogEntry> {
        lines
            .iter()
            .enumerate()
            .map(|(i, (who, text))| LogEntry::new(i as u64, who, text))
            .collect()
    }

    #[tokio::test]
    async fn plain_log_round_trips_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MessageHistory.txt");
        let sink = FileSink::new(&path, RecordFormat::Plain);

        let written = sink
            .persist(&entries(&[("client1", "hi"), ("client2", "yo")]))
            .await
            .unwrap();

        assert_eq!(written, 2);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "client1: hi\nclient2: yo\n");
    }

    #[tokio::test]
    async fn each_run_truncates_the_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "client9: stale\nclient9: stale\nclient9: stale\n").unwrap();

        FileSink::new(&path, RecordFormat::Plain)
            .persist(&entries(&[("client1", "fresh")]))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "client1: fresh\n");
    }

    #[tokio::test]
    async fn json_lines_log_decodes_back_to_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let original = entries(&[("client1", "two\nlines"), ("client2", "a: b")]);

        FileSink::new(&path, RecordFormat::JsonLines)
            .persist(&original)
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let decoded: Vec<_> = content
            .lines()
            .map(|line| RecordFormat::JsonLines.decode(line).unwrap())
            .collect();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0], original[0].to_record());
        assert_eq!(decoded[1], original[1].to_record());
    }

    #[tokio::test]
    async fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("no/such/dir/log.txt"), RecordFormat::Plain);

        let err = sink.persist(&entries(&[("client1", "x")])).await.unwrap_err();
        assert!(matches!(err, HistoryError::Io(_)));
    }
}
