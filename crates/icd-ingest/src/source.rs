//! Data row sources selected by data format kind.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use icd_model::{DataFormat, DataFormatKind, IcdError, Result};
use tracing::debug;

use crate::decode::{DecodingReader, cannot_read};
use crate::delimited::{DelimitedOptions, DelimitedRows};
use crate::fixed::FixedRows;
use crate::row::Row;

/// Rows of a data input in one of the supported text formats.
pub enum DataRows<R: Read> {
    Delimited(DelimitedRows<DecodingReader<R>>),
    Fixed(FixedRows<R>),
}

impl<R: Read> Iterator for DataRows<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Delimited(rows) => rows.next(),
            Self::Fixed(rows) => rows.next(),
        }
    }
}

fn not_implemented(kind: DataFormatKind) -> IcdError {
    IcdError::data_format_syntax(format!(
        "validation of {kind} data is not implemented; supported formats: delimited, fixed"
    ))
}

/// Rows of `input` interpreted according to `data_format`.
///
/// The input is decoded while rows are read. `field_lengths` are the widths
/// of the declared fields and only matter for fixed width data.
pub fn data_rows<R: Read>(
    input: R,
    source_id: &str,
    data_format: &DataFormat,
    field_lengths: &[usize],
) -> Result<DataRows<R>> {
    let kind = data_format.kind();
    if !matches!(kind, DataFormatKind::Delimited | DataFormatKind::Fixed) {
        return Err(not_implemented(kind));
    }
    let input = DecodingReader::new(input, data_format.encoding(), source_id);
    if kind == DataFormatKind::Fixed {
        return Ok(DataRows::Fixed(FixedRows::new(
            input,
            source_id,
            field_lengths.to_vec(),
            data_format.line_delimiter(),
            data_format.header(),
        )));
    }
    let options = DelimitedOptions::from_data_format(data_format);
    DelimitedRows::new(input, source_id, &options).map(DataRows::Delimited)
}

/// Open the data file at `path` according to `data_format`.
pub fn open_data_rows(
    path: &Path,
    data_format: &DataFormat,
    field_lengths: &[usize],
) -> Result<DataRows<BufReader<File>>> {
    if data_format.kind().is_spreadsheet() {
        return Err(not_implemented(data_format.kind()));
    }
    let file = File::open(path).map_err(|error| cannot_read(path, error))?;
    debug!(path = %path.display(), format = %data_format.kind(), "reading data");
    data_rows(BufReader::new(file), &path.to_string_lossy(), data_format, field_lengths)
}
