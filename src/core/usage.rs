//! Monthly character usage ledger for the metered provider

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::errors::{Result, TranslationError};

/// Monthly character cap of the metered provider
pub const MAX_LIMIT: u64 = 2_000_000;

/// Usage at or above this level raises a warning (90% of the cap)
pub const WARNING_THRESHOLD: u64 = MAX_LIMIT / 10 * 9;

/// Usage at or above this level is shown as elevated (75% of the cap)
pub const ELEVATED_THRESHOLD: u64 = MAX_LIMIT / 4 * 3;

/// The only engine whose usage is metered
pub const METERED_ENGINE: &str = "microsoft";

/// Whether usage through `engine` is counted against the cap
pub fn is_metered(engine: &str) -> bool {
    engine.eq_ignore_ascii_case(METERED_ENGINE)
}

/// Month key in `YYYY-MM` form
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Month key for the local calendar date
pub fn current_month() -> String {
    month_key(Local::now().date_naive())
}

/// Persisted usage counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Month the count belongs to, `YYYY-MM`
    pub month: String,
    /// Characters sent to the metered provider this month
    pub used: u64,
}

impl UsageRecord {
    /// Empty record for the given month
    pub fn fresh(month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            used: 0,
        }
    }

    /// Characters left before the cap
    pub fn remaining(&self) -> u64 {
        MAX_LIMIT.saturating_sub(self.used)
    }

    /// Fraction of the cap consumed, 0.0 to 1.0
    pub fn fraction_used(&self) -> f64 {
        self.used.min(MAX_LIMIT) as f64 / MAX_LIMIT as f64
    }
}

/// Result of a threshold check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdStatus {
    /// Below the warning threshold
    Ok,
    /// At or above the warning threshold
    Warn,
}

/// Display band of a usage level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageBand {
    /// Below 75%
    Normal,
    /// 75% up to 90%
    Elevated,
    /// 90% and above
    Critical,
}

impl UsageBand {
    /// Band for a monthly count
    pub fn for_used(used: u64) -> Self {
        if used >= WARNING_THRESHOLD {
            UsageBand::Critical
        } else if used >= ELEVATED_THRESHOLD {
            UsageBand::Elevated
        } else {
            UsageBand::Normal
        }
    }
}

/// Snapshot used for the usage statistics view
#[derive(Debug, Clone, PartialEq)]
pub struct UsageReport {
    /// Current month, `YYYY-MM`
    pub month: String,
    /// Characters used this month
    pub used: u64,
    /// Monthly cap
    pub limit: u64,
    /// Characters left before the cap
    pub remaining: u64,
    /// Share of the cap used, 0 to 100
    pub percent: f64,
    /// Display band for `used`
    pub band: UsageBand,
}

/// File-backed ledger. Every operation reads the file afresh; nothing is
/// cached between calls. Not safe for use by several processes at once.
#[derive(Debug, Clone)]
pub struct UsageLedger {
    path: PathBuf,
}

impl UsageLedger {
    /// Create a ledger stored at `path`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Location of the persisted record
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted record. Missing or unreadable files yield an empty
    /// record for the current month.
    pub fn load(&self) -> UsageRecord {
        self.load_for(&current_month())
    }

    fn load_for(&self, month: &str) -> UsageRecord {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No usage record at {}: {}", self.path.display(), e);
                return UsageRecord::fresh(month);
            }
        };

        match serde_json::from_str::<UsageRecord>(&content) {
            Ok(mut record) => {
                record.used = record.used.min(MAX_LIMIT);
                record
            }
            Err(e) => {
                warn!("Ignoring unreadable usage record {}: {}", self.path.display(), e);
                UsageRecord::fresh(month)
            }
        }
    }

    /// Add `chars` to `record` for the current month and persist the result
    pub fn record_usage(&self, record: UsageRecord, chars: u64) -> Result<UsageRecord> {
        self.record_usage_in(record, chars, &current_month())
    }

    /// Add `chars` to `record` as of `month` and persist the result.
    ///
    /// A record from another month is reset to zero first; the previous
    /// balance is discarded. The total is clamped to [`MAX_LIMIT`].
    pub fn record_usage_in(&self, record: UsageRecord, chars: u64, month: &str) -> Result<UsageRecord> {
        let mut record = if record.month != month {
            info!("Usage month rolled over from {} to {}", record.month, month);
            UsageRecord::fresh(month)
        } else {
            record
        };

        record.used = record.used.saturating_add(chars).min(MAX_LIMIT);
        self.persist(&record)?;

        debug!("Recorded {} chars, {} used in {}", chars, record.used, record.month);
        Ok(record)
    }

    /// Warn when usage has reached 90% of the cap. Warns on every call while
    /// above the threshold.
    pub fn check_threshold(&self, record: &UsageRecord) -> ThresholdStatus {
        if record.used >= WARNING_THRESHOLD {
            warn!(
                "Usage limit nearly exhausted: {} of {} characters used",
                record.used, MAX_LIMIT
            );
            ThresholdStatus::Warn
        } else {
            ThresholdStatus::Ok
        }
    }

    /// Statistics for the current month. A stale record reports zero usage.
    pub fn report(&self) -> UsageReport {
        let month = current_month();
        let mut record = self.load_for(&month);
        if record.month != month {
            record = UsageRecord::fresh(month);
        }

        UsageReport {
            month: record.month.clone(),
            used: record.used,
            limit: MAX_LIMIT,
            remaining: record.remaining(),
            percent: record.fraction_used() * 100.0,
            band: UsageBand::for_used(record.used),
        }
    }

    /// Rewrite the record wholesale via a temp file and rename
    fn persist(&self, record: &UsageRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| TranslationError::FileError {
                    path: parent.display().to_string(),
                    message: e.to_string(),
                })?;
            }
        }

        let json = serde_json::to_string_pretty(record)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| TranslationError::FileError {
            path: tmp_path.display().to_string(),
            message: e.to_string(),
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| TranslationError::FileError {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }
}
