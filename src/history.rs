use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::session::SessionSummary;

/// One line of the play history log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub date: String,
    pub catalog: String,
    pub levels: u32,
    pub decrypted: u32,
    pub score: i64,
    pub total_secs: u32,
    pub hints: u32,
}

impl HistoryRow {
    pub fn from_summary(catalog: &str, summary: &SessionSummary) -> Self {
        Self {
            date: Local::now().format("%c").to_string(),
            catalog: catalog.to_string(),
            levels: summary.total_levels,
            decrypted: summary.successes(),
            score: summary.score,
            total_secs: summary.total_time_secs(),
            hints: summary.hints_used(),
        }
    }
}

/// Append-only CSV log of completed sessions
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new() -> Option<Self> {
        AppDirs::history_path().map(Self::with_path)
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, row: &HistoryRow) -> Result<(), csv::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !self.path.exists();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<HistoryRow>, csv::Error> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        reader.deserialize().collect()
    }
}
