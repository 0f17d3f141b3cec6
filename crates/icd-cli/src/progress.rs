//! Spinner and log output while rows are validated.

use std::time::Duration;

use icd_ingest::Row;
use icd_model::RowValues;
use icd_validate::ValidationListener;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::logging::redact_value;

const SPINNER_TEMPLATE: &str = "{spinner} {prefix} {pos} rows ({msg})";

/// Listener ticking a spinner per row and logging rejected rows.
pub struct ProgressListener {
    bar: ProgressBar,
    rejected: u64,
}

impl ProgressListener {
    /// Spinner for `label`; hidden unless `visible`.
    pub fn new(label: &str, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::with_template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(label.to_string());
        bar.set_message("0 rejected");
        if visible {
            bar.enable_steady_tick(Duration::from_millis(120));
        }
        Self { bar, rejected: 0 }
    }

    pub fn rows(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ValidationListener for ProgressListener {
    fn on_accepted(&mut self, _row: &Row, _values: &RowValues) {
        self.bar.inc(1);
    }

    fn on_rejected(&mut self, row: &Row, reason: &str) {
        self.rejected += 1;
        self.bar.inc(1);
        self.bar.set_message(format!("{} rejected", self.rejected));
        debug!(
            location = %row.location,
            cells = %redact_value(&row.cells.join("|")),
            reason = %reason,
            "rejected row"
        );
    }
}
