//! The built ICD and its validation pass.

use std::path::Path;
use std::sync::LazyLock;

use icd_ingest::{Row, RowSource, open_data_rows, read_icd_rows};
use icd_model::{DataFormat, IcdError, Result, RowValues};
use tracing::{debug, info, info_span, trace, warn};

use crate::builder::{IcdBuilder, TypeRegistries};
use crate::checks::{Check, CheckPass};
use crate::fields::FieldFormat;
use crate::listener::{ValidationListener, ValidationSummary};

static BUILTIN_TYPES: LazyLock<TypeRegistries> = LazyLock::new(TypeRegistries::with_builtins);

/// Data format, fields and checks declared by an ICD.
///
/// A document is immutable once built and can validate any number of
/// inputs, also from several threads at once; the state of checks lives
/// in the individual pass.
#[derive(Debug)]
pub struct InterfaceControlDocument {
    data_format: DataFormat,
    fields: Vec<Box<dyn FieldFormat>>,
    checks: Vec<Box<dyn Check>>,
}

/// Why a row was rejected.
enum Rejection {
    Field(String),
    Check(String),
}

impl InterfaceControlDocument {
    pub(crate) fn new(
        data_format: DataFormat,
        fields: Vec<Box<dyn FieldFormat>>,
        checks: Vec<Box<dyn Check>>,
    ) -> Self {
        Self {
            data_format,
            fields,
            checks,
        }
    }

    /// Read an ICD using the built-in field and check types.
    pub fn read(rows: impl RowSource) -> Result<Self> {
        Self::read_with(rows, &BUILTIN_TYPES)
    }

    /// Read an ICD using the types in `registries`.
    ///
    /// The first error in the definition aborts reading.
    pub fn read_with(rows: impl RowSource, registries: &TypeRegistries) -> Result<Self> {
        let mut builder = IcdBuilder::new(registries);
        for row in rows {
            builder.add_row(&row?)?;
        }
        let document = builder.build()?;
        debug!(
            format = %document.data_format.kind().name(),
            fields = document.fields.len(),
            checks = document.checks.len(),
            "icd read"
        );
        Ok(document)
    }

    /// Read the ICD file at `path` using the built-in types.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::read(read_icd_rows(path)?)
    }

    pub fn data_format(&self) -> &DataFormat {
        &self.data_format
    }

    /// Fields in declaration order, which is the expected column order.
    pub fn field_formats(&self) -> &[Box<dyn FieldFormat>] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name()).collect()
    }

    pub fn field_format(&self, name: &str) -> Option<&dyn FieldFormat> {
        self.fields
            .iter()
            .find(|field| field.name() == name)
            .map(AsRef::as_ref)
    }

    /// Checks in declaration order.
    pub fn checks(&self) -> &[Box<dyn Check>] {
        &self.checks
    }

    pub fn check(&self, description: &str) -> Option<&dyn Check> {
        self.checks
            .iter()
            .find(|check| check.description() == description)
            .map(AsRef::as_ref)
    }

    /// Exact field lengths used to cut fixed width records; `0` for fields
    /// without one.
    pub fn field_lengths(&self) -> Vec<usize> {
        self.fields
            .iter()
            .map(|field| field.spec().exact_length().unwrap_or(0))
            .collect()
    }

    /// Validate the data file at `path`.
    ///
    /// A file that cannot be opened is reported like any other data format
    /// failure.
    pub fn validate_path(
        &self,
        path: &Path,
        listeners: &mut [&mut dyn ValidationListener],
    ) -> ValidationSummary {
        match open_data_rows(path, &self.data_format, &self.field_lengths()) {
            Ok(rows) => self.validate(rows, listeners),
            Err(error) => {
                let reason = error.to_string();
                warn!(path = %path.display(), error = %reason, "cannot open data");
                for listener in listeners.iter_mut() {
                    listener.on_data_format_failed(&reason);
                }
                ValidationSummary {
                    data_format_failure: Some(reason),
                    ..ValidationSummary::default()
                }
            }
        }
    }

    /// Validate `rows`, reporting every row to `listeners`.
    ///
    /// Rejected rows never stop the pass; a row source error does, after
    /// which checks at end are skipped.
    pub fn validate(
        &self,
        rows: impl RowSource,
        listeners: &mut [&mut dyn ValidationListener],
    ) -> ValidationSummary {
        let span = info_span!("validate", fields = self.fields.len(), checks = self.checks.len());
        let _guard = span.enter();
        info!("validation started");

        let mut passes: Vec<(&dyn Check, Box<dyn CheckPass + '_>)> = self
            .checks
            .iter()
            .map(|check| (check.as_ref(), check.start()))
            .collect();
        let mut summary = ValidationSummary::default();
        let mut row_number = 0;

        for row in rows {
            let row = match row {
                Ok(row) => row,
                Err(error) => {
                    let reason = error.to_string();
                    warn!(error = %reason, "data format failed");
                    for listener in listeners.iter_mut() {
                        listener.on_data_format_failed(&reason);
                    }
                    summary.data_format_failure = Some(reason);
                    break;
                }
            };
            row_number += 1;
            match self.validate_row(&row, row_number, &mut passes) {
                Ok(values) => {
                    trace!(row = row_number, location = %row.location, "accepted");
                    summary.accepted += 1;
                    for listener in listeners.iter_mut() {
                        listener.on_accepted(&row, &values);
                    }
                }
                Err(Rejection::Field(reason)) => {
                    warn!(row = row_number, reason = %reason, "rejected");
                    summary.rejected += 1;
                    for listener in listeners.iter_mut() {
                        listener.on_rejected(&row, &reason);
                    }
                }
                Err(Rejection::Check(reason)) => {
                    warn!(row = row_number, reason = %reason, "row check failed");
                    summary.rejected += 1;
                    summary.row_check_failures += 1;
                    for listener in listeners.iter_mut() {
                        listener.on_row_check_failed(&row, &reason);
                        listener.on_rejected(&row, &reason);
                    }
                }
            }
        }

        if summary.data_format_failure.is_none() {
            for (check, pass) in &mut passes {
                if let Err(error) = pass.check_at_end() {
                    let reason = format!(
                        "check at end of data failed: '{}': {error}",
                        check.description()
                    );
                    warn!(check = %check.description(), reason = %reason, "end check failed");
                    summary.end_check_failures += 1;
                    for listener in listeners.iter_mut() {
                        listener.on_end_check_failed(&reason);
                    }
                }
            }
        }

        info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            end_check_failures = summary.end_check_failures,
            "validation finished"
        );
        summary
    }

    fn validate_row(
        &self,
        row: &Row,
        row_number: usize,
        passes: &mut [(&dyn Check, Box<dyn CheckPass + '_>)],
    ) -> std::result::Result<RowValues, Rejection> {
        let mut values = RowValues::new();
        for (index, (raw, field)) in row.cells.iter().zip(&self.fields).enumerate() {
            let location = row.cell_location(index);
            self.data_format
                .validate_characters(raw, &location)
                .and_then(|()| field.validated(raw))
                .map(|value| {
                    values.insert(field.name().to_string(), value);
                })
                .map_err(|error| {
                    Rejection::Field(format!(
                        "field '{}' does not match format: {}",
                        field.name(),
                        error.or_at(&location)
                    ))
                })?;
        }
        if let Some(error) = self.item_count_error(row) {
            return Err(Rejection::Field(error.to_string()));
        }
        for (check, pass) in passes.iter_mut() {
            pass.check_row(row_number, &values).map_err(|error| {
                Rejection::Check(format!(
                    "check '{}' failed: {}",
                    check.description(),
                    error.or_at(&row.location)
                ))
            })?;
        }
        Ok(values)
    }

    fn item_count_error(&self, row: &Row) -> Option<IcdError> {
        let expected = self.fields.len();
        let actual = row.len();
        if actual > expected {
            Some(
                IcdError::field_value(format!(
                    "row must contain {expected} items but has {actual}; \
                     unexpected data must be removed beginning at item {}",
                    expected + 1
                ))
                .at(&row.cell_location(expected)),
            )
        } else if actual < expected {
            let missing = self.fields[actual].name();
            Some(
                IcdError::field_value(format!(
                    "row must contain {expected} items but has {actual}; \
                     item {} for field '{missing}' is missing",
                    actual + 1
                ))
                .at(&row.cell_location(actual)),
            )
        } else {
            None
        }
    }
}
