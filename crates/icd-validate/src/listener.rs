//! Observers of a validation pass.

use icd_ingest::Row;
use icd_model::{Location, RowValues};
use serde::Serialize;

/// Receives the outcome of every row of a validation pass.
///
/// All methods default to doing nothing so listeners only implement what
/// they care about.
pub trait ValidationListener {
    /// All fields and checks passed.
    fn on_accepted(&mut self, _row: &Row, _values: &RowValues) {}

    /// A field did not match its format or the row had the wrong number of
    /// items.
    fn on_rejected(&mut self, _row: &Row, _reason: &str) {}

    /// A check failed for this row; followed by [`Self::on_rejected`] for
    /// the same row.
    fn on_row_check_failed(&mut self, _row: &Row, _reason: &str) {}

    /// A check failed after the last row.
    fn on_end_check_failed(&mut self, _reason: &str) {}

    /// The input could not be read any further; the pass stops.
    fn on_data_format_failed(&mut self, _reason: &str) {}
}

/// Counts of a finished validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub accepted: usize,
    pub rejected: usize,
    /// Rejected rows that failed because of a check; included in `rejected`.
    pub row_check_failures: usize,
    pub end_check_failures: usize,
    /// Reason the input stopped being readable, if it did.
    pub data_format_failure: Option<String>,
}

impl ValidationSummary {
    /// True if no row was rejected and no check or data format error occurred.
    pub fn is_valid(&self) -> bool {
        self.rejected == 0 && self.end_check_failures == 0 && self.data_format_failure.is_none()
    }
}

/// Row of a [`ValidationReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedRow {
    pub location: Location,
    pub cells: Vec<String>,
    /// Values for accepted rows, the reason for rejected ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<RowValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Listener collecting every event, e.g. for tests or JSON output.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Keep accepted rows; otherwise only their count is recorded.
    #[serde(skip)]
    keep_accepted: bool,
    pub accepted_count: usize,
    pub accepted: Vec<ReportedRow>,
    pub rejected: Vec<ReportedRow>,
    pub row_check_failures: Vec<ReportedRow>,
    pub end_check_failures: Vec<String>,
    pub data_format_failures: Vec<String>,
}

impl ValidationReport {
    /// Report that records rejected rows and failures only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report that also records accepted rows with their values.
    pub fn with_accepted_rows() -> Self {
        Self {
            keep_accepted: true,
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.rejected.is_empty()
            && self.end_check_failures.is_empty()
            && self.data_format_failures.is_empty()
    }
}

impl ValidationListener for ValidationReport {
    fn on_accepted(&mut self, row: &Row, values: &RowValues) {
        self.accepted_count += 1;
        if self.keep_accepted {
            self.accepted.push(ReportedRow {
                location: row.location.clone(),
                cells: row.cells.clone(),
                values: Some(values.clone()),
                reason: None,
            });
        }
    }

    fn on_rejected(&mut self, row: &Row, reason: &str) {
        self.rejected.push(rejected_row(row, reason));
    }

    fn on_row_check_failed(&mut self, row: &Row, reason: &str) {
        self.row_check_failures.push(rejected_row(row, reason));
    }

    fn on_end_check_failed(&mut self, reason: &str) {
        self.end_check_failures.push(reason.to_string());
    }

    fn on_data_format_failed(&mut self, reason: &str) {
        self.data_format_failures.push(reason.to_string());
    }
}

fn rejected_row(row: &Row, reason: &str) -> ReportedRow {
    ReportedRow {
        location: row.location.clone(),
        cells: row.cells.clone(),
        values: None,
        reason: Some(reason.to_string()),
    }
}
