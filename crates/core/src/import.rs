//! Core types, constants, and pure logic for the bulk product import
//! pipeline.
//!
//! This module has zero external dependencies (no DB, no async, no I/O).
//! It provides:
//!
//! - Constants for batch sizing, pacing, job lifecycle bounds, and retention.
//! - Types for import rows and job status.
//! - Pure functions: header resolution, field sanitisation, progress math,
//!   and row-error formatting.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of rows processed between pacing pauses.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default pause between batches, protecting the generation service and
/// the database from burst load.
pub const DEFAULT_BATCH_PAUSE_MS: u64 = 500;

/// Wall-clock budget for a single import attempt.
pub const JOB_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Maximum number of attempts before a job is failed permanently.
pub const MAX_ATTEMPTS: u32 = 3;

/// How long progress and result records are retained after their last write.
pub const RESULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Share of the progress bar reserved for setup (counting + reading).
pub const SETUP_PROGRESS_PCT: u8 = 15;

/// Share of the progress bar reserved for finalisation.
pub const FINALIZE_RESERVED_PCT: u8 = 15;

/// Provenance tag written on every record created by the bulk importer.
pub const SOURCE_METHOD_BULK_IMPORT: &str = "bulk_import";

/// Message written when a file contains no rows with a usable name.
pub const MSG_NO_PRODUCTS: &str = "No products found in file";

// ---------------------------------------------------------------------------
// Job status
// ---------------------------------------------------------------------------

/// Lifecycle status of one bulk-import job, as exposed to pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    CompletedWithErrors,
    Failed,
}

impl JobStatus {
    /// Return the status name as stored in progress records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::CompletedWithErrors => "completed_with_errors",
            Self::Failed => "failed",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "completed_with_errors" => Some(Self::CompletedWithErrors),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// `true` once a job can no longer make progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::CompletedWithErrors | Self::Failed
        )
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &[
        "queued",
        "processing",
        "completed",
        "completed_with_errors",
        "failed",
    ];
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Import rows
// ---------------------------------------------------------------------------

/// One candidate record extracted from the source file.
///
/// Constructed only through [`ImportRow::from_fields`], which guarantees a
/// non-empty name. Rows without a usable name never become catalog records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRow {
    /// 1-based position after the header row, used in error messages.
    pub row_number: usize,
    /// Product name, trimmed, never empty.
    pub name: String,
    /// Description from the file; `None` triggers enrichment.
    pub description: Option<String>,
    /// Image URL from the file; `None` triggers enrichment.
    pub image_url: Option<String>,
}

impl ImportRow {
    /// Build a row from already-sanitised field values.
    ///
    /// Returns `None` when the name is empty after trimming; such rows are
    /// silently omitted from the import, not counted as errors.
    pub fn from_fields(
        row_number: usize,
        name: &str,
        description: Option<&str>,
        image_url: Option<&str>,
    ) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            row_number,
            name: name.to_string(),
            description: non_empty(description),
            image_url: non_empty(image_url),
        })
    }
}

/// Treat empty and whitespace-only values as absent.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

/// Column indices resolved from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub description: Option<usize>,
    pub image_url: Option<usize>,
}

/// Resolve header cells to column indices.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
/// The name column accepts either `product_name` or `name` (files exported
/// from different tools disagree on the header). Returns `None` when no
/// name column is present, which is fatal to the whole job.
pub fn resolve_columns(headers: &[String]) -> Option<ColumnMap> {
    let normalised: Vec<String> = headers
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let find = |candidates: &[&str]| {
        normalised
            .iter()
            .position(|h| candidates.contains(&h.as_str()))
    };

    let name = find(&["product_name", "name"])?;
    Some(ColumnMap {
        name,
        description: find(&["description"]),
        image_url: find(&["image_url"]),
    })
}

// ---------------------------------------------------------------------------
// Field sanitisation
// ---------------------------------------------------------------------------

/// Sanitise a raw field value for safe downstream use.
///
/// Strips ASCII control characters (including embedded NUL and stray
/// carriage returns left over from mixed line endings) and trims
/// surrounding whitespace. Invalid UTF-8 is handled earlier by lossy
/// decoding, so replacement characters pass through unchanged.
pub fn sanitize_field(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Progress math
// ---------------------------------------------------------------------------

/// Progress percentage for `rows_done` of `total_rows` processed rows.
///
/// The first 15% of the bar is reserved for setup and the last 15% for
/// finalisation, so row processing maps onto the 15..=85 band. With zero
/// rows the setup share is reported unchanged.
pub fn row_progress(rows_done: usize, total_rows: usize) -> u8 {
    if total_rows == 0 {
        return SETUP_PROGRESS_PCT;
    }
    let band = 100 - SETUP_PROGRESS_PCT as usize - FINALIZE_RESERVED_PCT as usize;
    let pct = SETUP_PROGRESS_PCT as usize + rows_done * band / total_rows;
    pct.min(100 - FINALIZE_RESERVED_PCT as usize) as u8
}

/// Number of batches needed for `total_rows` rows at `batch_size`.
pub fn batch_count(total_rows: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    total_rows.div_ceil(batch_size)
}

// ---------------------------------------------------------------------------
// Error formatting
// ---------------------------------------------------------------------------

/// Human-readable description of one failed row, as stored in a job's
/// error list.
pub fn row_error_message(row_number: usize, name: &str, message: &str) -> String {
    format!("Row {row_number} ({name}): {message}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- JobStatus tests --

    #[test]
    fn test_status_round_trip() {
        for s in JobStatus::ALL {
            let parsed = JobStatus::from_str(s).unwrap();
            assert_eq!(parsed.as_str(), *s);
        }
    }

    #[test]
    fn test_status_unknown() {
        assert!(JobStatus::from_str("running").is_none());
        assert!(JobStatus::from_str("").is_none());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::CompletedWithErrors.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    // -- ImportRow tests --

    #[test]
    fn test_row_requires_name() {
        assert!(ImportRow::from_fields(1, "", None, None).is_none());
        assert!(ImportRow::from_fields(1, "   ", None, None).is_none());
        assert!(ImportRow::from_fields(1, "\t\n", None, None).is_none());
    }

    #[test]
    fn test_row_trims_name() {
        let row = ImportRow::from_fields(3, "  Walnut Desk  ", None, None).unwrap();
        assert_eq!(row.name, "Walnut Desk");
        assert_eq!(row.row_number, 3);
    }

    #[test]
    fn test_row_blank_optionals_become_none() {
        let row = ImportRow::from_fields(1, "Lamp", Some("   "), Some("")).unwrap();
        assert!(row.description.is_none());
        assert!(row.image_url.is_none());
    }

    #[test]
    fn test_row_keeps_present_optionals() {
        let row = ImportRow::from_fields(
            1,
            "Lamp",
            Some("A lamp."),
            Some("https://example.com/lamp.png"),
        )
        .unwrap();
        assert_eq!(row.description.as_deref(), Some("A lamp."));
        assert_eq!(
            row.image_url.as_deref(),
            Some("https://example.com/lamp.png")
        );
    }

    // -- resolve_columns tests --

    fn headers(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_standard_headers() {
        let map = resolve_columns(&headers(&["product_name", "description", "image_url"])).unwrap();
        assert_eq!(map.name, 0);
        assert_eq!(map.description, Some(1));
        assert_eq!(map.image_url, Some(2));
    }

    #[test]
    fn test_resolve_name_alias() {
        let map = resolve_columns(&headers(&["description", "name"])).unwrap();
        assert_eq!(map.name, 1);
        assert_eq!(map.description, Some(0));
        assert_eq!(map.image_url, None);
    }

    #[test]
    fn test_resolve_case_and_whitespace_insensitive() {
        let map = resolve_columns(&headers(&[" Product_Name ", "DESCRIPTION"])).unwrap();
        assert_eq!(map.name, 0);
        assert_eq!(map.description, Some(1));
    }

    #[test]
    fn test_resolve_missing_name_column() {
        assert!(resolve_columns(&headers(&["description", "image_url"])).is_none());
        assert!(resolve_columns(&headers(&[])).is_none());
    }

    // -- sanitize_field tests --

    #[test]
    fn test_sanitize_strips_control_chars() {
        assert_eq!(sanitize_field("Oak\u{0}Chair\u{7}"), "OakChair");
        assert_eq!(sanitize_field("line\r\nbreak"), "linebreak");
    }

    #[test]
    fn test_sanitize_trims() {
        assert_eq!(sanitize_field("  padded  "), "padded");
    }

    #[test]
    fn test_sanitize_keeps_replacement_char() {
        // Lossy decoding upstream turns invalid bytes into U+FFFD.
        assert_eq!(sanitize_field("caf\u{FFFD}"), "caf\u{FFFD}");
    }

    // -- row_progress tests --

    #[test]
    fn test_progress_starts_at_setup_share() {
        assert_eq!(row_progress(0, 10), 15);
    }

    #[test]
    fn test_progress_reserves_finalize_share() {
        assert_eq!(row_progress(10, 10), 85);
    }

    #[test]
    fn test_progress_midpoint() {
        assert_eq!(row_progress(5, 10), 50);
    }

    #[test]
    fn test_progress_zero_total() {
        assert_eq!(row_progress(0, 0), 15);
    }

    #[test]
    fn test_progress_monotonic() {
        let total = 12;
        let mut last = 0;
        for done in 0..=total {
            let pct = row_progress(done, total);
            assert!(pct >= last, "progress regressed at {done}/{total}");
            last = pct;
        }
    }

    // -- batch_count tests --

    #[test]
    fn test_batch_count() {
        assert_eq!(batch_count(12, 5), 3);
        assert_eq!(batch_count(10, 5), 2);
        assert_eq!(batch_count(1, 5), 1);
        assert_eq!(batch_count(0, 5), 0);
        assert_eq!(batch_count(7, 0), 0);
    }

    // -- row_error_message tests --

    #[test]
    fn test_row_error_message_shape() {
        assert_eq!(
            row_error_message(4, "Oak Chair", "storage unavailable"),
            "Row 4 (Oak Chair): storage unavailable"
        );
    }
}
