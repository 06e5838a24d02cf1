//! Append-only daily translation log

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::errors::{Result, TranslationError};

/// One line of the daily log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// RFC 3339 local time
    pub timestamp: String,
    /// Source language code
    pub from: String,
    /// Target language code
    pub to: String,
    /// Text as submitted
    pub source: String,
    /// Translated text or inline error
    pub result: String,
}

impl AuditEntry {
    /// Entry stamped with the current local time
    pub fn now(from: &str, to: &str, source: &str, result: &str) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            from: from.to_string(),
            to: to.to_string(),
            source: source.to_string(),
            result: result.to_string(),
        }
    }
}

/// Directory of `log_YYYY-MM-DD.jsonl` files
#[derive(Debug, Clone)]
pub struct AuditLog {
    dir: PathBuf,
}

impl AuditLog {
    /// Log writing into `dir`, created on first append
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the daily files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Log file for a given day
    pub fn log_path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("log_{}.jsonl", date.format("%Y-%m-%d")))
    }

    /// Append an entry to today's file
    pub fn append(&self, entry: &AuditEntry) -> Result<PathBuf> {
        self.append_on(Local::now().date_naive(), entry)
    }

    /// Append an entry to the file of `date`
    pub fn append_on(&self, date: NaiveDate, entry: &AuditEntry) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|e| TranslationError::FileError {
            path: self.dir.display().to_string(),
            message: e.to_string(),
        })?;

        let path = self.log_path_for(date);
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| TranslationError::FileError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        file.write_all(line.as_bytes())?;

        debug!("Logged translation to {}", path.display());
        Ok(path)
    }
}
