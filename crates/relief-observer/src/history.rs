//! Append-only run history.
//!
//! One JSON object per line, one line per completed run. Lines that fail
//! to parse are skipped with a warning so a truncated write never hides
//! the rest of the history.

use std::path::{Path, PathBuf};

use relief_types::RunRecord;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::HistoryError;

/// JSON-lines file of [`RunRecord`]s.
#[derive(Debug)]
pub struct RunHistory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RunHistory {
    /// Use the history file at `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    pub async fn append(&self, record: &RunRecord) -> Result<(), HistoryError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// All readable records, oldest first. A missing file is an empty
    /// history.
    pub async fn load(&self) -> Result<Vec<RunRecord>, HistoryError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let records = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(path = %self.path.display(), line = index.saturating_add(1), error = %e, "skipping malformed run record");
                    None
                }
            })
            .collect();
        Ok(records)
    }
}
