//! Delimited (CSV like) row source built on the `csv` crate.

use std::io::{Cursor, Read};

use csv::{ReaderBuilder, StringRecord, Terminator};
use icd_model::{DataFormat, IcdError, LineDelimiter, Location, Result};

use crate::decode::read_error;
use crate::row::Row;

/// Dialect of a delimited input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedOptions {
    pub item_delimiter: char,
    pub quote_character: char,
    pub escape_character: char,
    pub line_delimiter: LineDelimiter,
    /// Number of leading rows to skip.
    pub header: usize,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            item_delimiter: ',',
            quote_character: '"',
            escape_character: '"',
            line_delimiter: LineDelimiter::Any,
            header: 0,
        }
    }
}

impl DelimitedOptions {
    pub fn from_data_format(data_format: &DataFormat) -> Self {
        Self {
            item_delimiter: data_format.item_delimiter(),
            quote_character: data_format.quote_character(),
            escape_character: data_format.escape_character(),
            line_delimiter: data_format.line_delimiter(),
            header: data_format.header(),
        }
    }

    #[must_use]
    pub fn with_item_delimiter(mut self, delimiter: char) -> Self {
        self.item_delimiter = delimiter;
        self
    }

    fn reader_builder(&self) -> Result<ReaderBuilder> {
        let delimiter = ascii_byte("item delimiter", self.item_delimiter)?;
        let quote = ascii_byte("quote character", self.quote_character)?;
        let escape = ascii_byte("escape character", self.escape_character)?;
        let terminator = match self.line_delimiter {
            LineDelimiter::Any | LineDelimiter::CrLf => Terminator::CRLF,
            LineDelimiter::Cr => Terminator::Any(b'\r'),
            LineDelimiter::Lf => Terminator::Any(b'\n'),
            LineDelimiter::None => {
                return Err(IcdError::data_format_syntax(
                    "delimited data must use a line delimiter",
                ));
            }
        };
        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .quote(quote)
            .terminator(terminator);
        if escape == quote {
            builder.double_quote(true).escape(None);
        } else {
            builder.double_quote(false).escape(Some(escape));
        }
        Ok(builder)
    }
}

fn ascii_byte(name: &str, character: char) -> Result<u8> {
    u8::try_from(character)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            IcdError::data_format_syntax(format!(
                "{name} for delimited data must be an ASCII character but is {character:?}"
            ))
        })
}

/// Rows of a delimited input.
///
/// Each row's location tracks cells; lines are the physical lines of the
/// input so quoted line breaks are accounted for.
pub struct DelimitedRows<R: Read> {
    reader: csv::Reader<R>,
    record: StringRecord,
    base: Location,
    rows_to_skip: usize,
    finished: bool,
}

impl<R: Read> DelimitedRows<R> {
    pub fn new(input: R, source_id: &str, options: &DelimitedOptions) -> Result<Self> {
        let reader = options.reader_builder()?.from_reader(input);
        Ok(Self {
            reader,
            record: StringRecord::new(),
            base: Location::new(source_id).with_cell(),
            rows_to_skip: options.header,
            finished: false,
        })
    }

    fn location_of_record(&self) -> Location {
        let mut location = self.base.clone();
        let line = self
            .record
            .position()
            .map(csv::Position::line)
            .unwrap_or(1)
            .saturating_sub(1);
        if line > 0 {
            location.advance_line(usize::try_from(line).unwrap_or(usize::MAX));
        }
        location
    }

    /// Errors raised by the underlying reader, such as a broken encoding,
    /// are passed on unchanged.
    fn parse_error(&self, error: csv::Error) -> IcdError {
        let mut location = self.base.clone();
        if let Some(line) = error.position().map(csv::Position::line)
            && line > 1
        {
            location.advance_line(usize::try_from(line - 1).unwrap_or(usize::MAX));
        }
        if !error.is_io_error() {
            return IcdError::data_format_value(format!("cannot parse delimited file: {error}"))
                .at(&location);
        }
        match error.into_kind() {
            csv::ErrorKind::Io(cause) => read_error(cause, &location),
            kind => IcdError::data_format_value(format!("cannot parse delimited file: {kind:?}"))
                .at(&location),
        }
    }
}

impl<R: Read> Iterator for DelimitedRows<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(false) => {
                    self.finished = true;
                    return None;
                }
                Ok(true) if self.rows_to_skip > 0 => {
                    self.rows_to_skip -= 1;
                }
                Ok(true) => {
                    let cells = self.record.iter().map(str::to_string).collect();
                    return Some(Ok(Row::new(cells, self.location_of_record())));
                }
                Err(error) => {
                    self.finished = true;
                    return Some(Err(self.parse_error(error)));
                }
            }
        }
    }
}

/// Delimited rows over already decoded text.
pub fn delimited_rows_from_str(
    source_id: &str,
    text: &str,
    options: &DelimitedOptions,
) -> Result<DelimitedRows<Cursor<Vec<u8>>>> {
    DelimitedRows::new(Cursor::new(text.as_bytes().to_vec()), source_id, options)
}
