use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use icd_validate::{InterfaceControlDocument, ValidationReport};
use tracing::{info, info_span};

use crate::progress::ProgressListener;
use crate::types::{FileOutcome, ValidationRun};

/// Options of `icd validate` besides its paths.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Write the JSON report here.
    pub report: Option<PathBuf>,
    pub show_progress: bool,
}

/// Read the ICD at `path`.
pub fn describe(path: &Path) -> Result<InterfaceControlDocument> {
    InterfaceControlDocument::from_path(path)
        .with_context(|| format!("read ICD {}", path.display()))
}

/// Read the ICD once and validate every data file against it.
///
/// Only a broken ICD or an unwritable report fails; problems with data files
/// end up in their [`FileOutcome`].
pub fn run_validate(
    icd_path: &Path,
    data_paths: &[PathBuf],
    options: &ValidateOptions,
) -> Result<ValidationRun> {
    let icd = describe(icd_path)?;
    let mut files = Vec::with_capacity(data_paths.len());
    for path in data_paths {
        let span = info_span!("file", path = %path.display());
        let _guard = span.enter();
        let started = Instant::now();
        let mut report = ValidationReport::new();
        let mut progress =
            ProgressListener::new(&path.display().to_string(), options.show_progress);
        let summary = icd.validate_path(path, &mut [&mut report, &mut progress]);
        progress.finish();
        info!(
            rows = progress.rows(),
            accepted = summary.accepted,
            rejected = summary.rejected,
            elapsed_ms = started.elapsed().as_millis(),
            "file validated"
        );
        files.push(FileOutcome {
            path: path.clone(),
            summary,
            report,
        });
    }
    let run = ValidationRun {
        icd: icd_path.to_path_buf(),
        files,
    };
    if let Some(report_path) = &options.report {
        write_report(&run, report_path)?;
    }
    Ok(run)
}

fn write_report(run: &ValidationRun, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create report {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), run)
        .with_context(|| format!("write report {}", path.display()))?;
    info!(path = %path.display(), "report written");
    Ok(())
}
