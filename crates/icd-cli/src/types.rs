use std::path::PathBuf;

use icd_validate::{ValidationReport, ValidationSummary};
use serde::Serialize;

/// Outcome of validating one data file.
#[derive(Debug, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub summary: ValidationSummary,
    pub report: ValidationReport,
}

/// Outcome of `icd validate`.
#[derive(Debug, Serialize)]
pub struct ValidationRun {
    pub icd: PathBuf,
    pub files: Vec<FileOutcome>,
}

impl ValidationRun {
    /// True if any file had rejected rows, failed checks or could not be read.
    pub fn has_failures(&self) -> bool {
        self.files.iter().any(|file| !file.summary.is_valid())
    }
}
