//! Common utilities shared across the logger

use std::time::Instant;

use chrono::{DateTime, Local};

/// Wall-clock format used inside record rows
pub const ROW_TIMESTAMP_FORMAT: &str = "%m/%d/%Y_%H:%M:%S";

/// Wall-clock format used in record file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%m_%d_%Y_%H_%M_%S";

/// Tracks elapsed time since creation
#[derive(Debug, Clone)]
pub struct TimeKeeper {
    start: Instant,
    started_at: DateTime<Local>,
}

impl TimeKeeper {
    /// Create a new TimeKeeper starting now
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            started_at: Local::now(),
        }
    }

    /// Get elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Wall-clock time captured at creation
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }
}

impl Default for TimeKeeper {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a wall-clock time as `MM/DD/YYYY_HH:MM:SS`
pub fn row_timestamp(time: &DateTime<Local>) -> String {
    time.format(ROW_TIMESTAMP_FORMAT).to_string()
}

/// Format a wall-clock time as `MM_DD_YYYY_HH_MM_SS`
pub fn file_timestamp(time: &DateTime<Local>) -> String {
    time.format(FILE_TIMESTAMP_FORMAT).to_string()
}
