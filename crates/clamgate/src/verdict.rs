//! Scan verdicts and their store-tag representation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag key written back onto the scanned object. The value is always one of
/// the four verdict strings.
pub const SCAN_STATUS_TAG_KEY: &str = "status";

/// Outcome of one pipeline invocation. Exactly one verdict is produced per
/// invocation; tagging and notification failures never alter it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanVerdict {
    Clean,
    Infected,
    SkippedTooLarge, // Object over the size ceiling; never fetched or scanned
    Error,           // Signature sync, fetch or scan failed
}

impl ScanVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanVerdict::Clean => "CLEAN",
            ScanVerdict::Infected => "INFECTED",
            ScanVerdict::SkippedTooLarge => "SKIPPED_TOO_LARGE",
            ScanVerdict::Error => "ERROR",
        }
    }

    /// True when the scan path itself failed (not for skipped objects).
    pub fn is_failure(&self) -> bool {
        matches!(self, ScanVerdict::Error)
    }
}

impl fmt::Display for ScanVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
