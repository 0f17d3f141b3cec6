//! Fixed width row source.

use std::io::Read;

use icd_model::{IcdError, LineDelimiter, Location, Result};

use crate::decode::DecodingReader;
use crate::row::Row;

/// Rows of a fixed width input.
///
/// Cells are cut by character counts. A line shorter than the declared
/// widths yields fewer (or a truncated last) cells, characters beyond the
/// declared widths end up in one extra cell; both are left to the
/// validator to reject.
///
/// Input is decoded and split while it is read, so only the current chunk
/// is kept in memory.
pub struct FixedRows<R> {
    input: DecodingReader<R>,
    buffer: String,
    position: usize,
    exhausted: bool,
    field_lengths: Vec<usize>,
    line_delimiter: LineDelimiter,
    base: Location,
    line: usize,
    rows_to_skip: usize,
    finished: bool,
}

impl<R: Read> FixedRows<R> {
    pub fn new(
        input: DecodingReader<R>,
        source_id: &str,
        field_lengths: Vec<usize>,
        line_delimiter: LineDelimiter,
        header: usize,
    ) -> Self {
        Self {
            input,
            buffer: String::new(),
            position: 0,
            exhausted: false,
            field_lengths,
            line_delimiter,
            base: Location::new(source_id).with_cell(),
            line: 0,
            rows_to_skip: header,
            finished: false,
        }
    }

    fn record_length(&self) -> usize {
        self.field_lengths.iter().sum()
    }

    /// Drop consumed text and append the next decoded chunk.
    fn fill(&mut self) -> Result<()> {
        self.buffer.drain(..self.position);
        self.position = 0;
        if self.input.read_text(&mut self.buffer)? == 0 {
            self.exhausted = true;
        }
        Ok(())
    }

    /// Next raw record without its line delimiter.
    fn next_record(&mut self) -> Result<Option<String>> {
        loop {
            let rest = &self.buffer[self.position..];
            if let Some((end, consumed)) = self.record_bounds(rest) {
                let record = rest[..end].to_string();
                self.position += consumed;
                return Ok(Some(record));
            }
            if self.exhausted {
                break;
            }
            self.fill()?;
        }
        let rest = &self.buffer[self.position..];
        if rest.is_empty() {
            return Ok(None);
        }
        let length = self.record_length();
        let message = if length == 0 {
            "fixed width data without line delimiter requires fields with a length".to_string()
        } else {
            let actual = rest.chars().count();
            format!("last record must have {length} characters but has only {actual}")
        };
        Err(IcdError::data_format_value(message).at(&self.current_location()))
    }

    /// Byte length of the next complete record in `rest` and the number of
    /// bytes it consumes including its delimiter, or `None` if more input
    /// is needed.
    fn record_bounds(&self, rest: &str) -> Option<(usize, usize)> {
        if rest.is_empty() {
            return None;
        }
        if self.line_delimiter == LineDelimiter::None {
            let end = rest
                .char_indices()
                .map(|(index, _)| index)
                .chain([rest.len()])
                .nth(self.record_length())
                .filter(|end| *end > 0)?;
            return Some((end, end));
        }
        match find_line_end(rest, self.line_delimiter) {
            // A trailing CR may be the first half of CRLF.
            Some((_, consumed))
                if self.line_delimiter == LineDelimiter::Any
                    && consumed == rest.len()
                    && rest.ends_with('\r')
                    && !self.exhausted =>
            {
                None
            }
            Some(bounds) => Some(bounds),
            None if self.exhausted => Some((rest.len(), rest.len())),
            None => None,
        }
    }

    fn current_location(&self) -> Location {
        let mut location = self.base.clone();
        if self.line > 0 {
            location.advance_line(self.line);
        }
        location
    }

    fn split_cells(&self, record: &str) -> Vec<String> {
        let mut cells = Vec::with_capacity(self.field_lengths.len());
        let mut chars = record.chars();
        for length in &self.field_lengths {
            let cell: String = chars.by_ref().take(*length).collect();
            if cell.is_empty() && *length > 0 {
                break;
            }
            cells.push(cell);
        }
        let rest: String = chars.collect();
        if !rest.is_empty() {
            cells.push(rest);
        }
        cells
    }
}

/// Position of the first line delimiter in `text` and the number of bytes
/// consumed up to and including it.
fn find_line_end(text: &str, delimiter: LineDelimiter) -> Option<(usize, usize)> {
    let (index, delimiter_length) = match delimiter {
        LineDelimiter::Any => text.find(['\r', '\n']).map(|index| {
            if text[index..].starts_with("\r\n") {
                (index, 2)
            } else {
                (index, 1)
            }
        }),
        LineDelimiter::Cr => text.find('\r').map(|index| (index, 1)),
        LineDelimiter::Lf => text.find('\n').map(|index| (index, 1)),
        LineDelimiter::CrLf => text.find("\r\n").map(|index| (index, 2)),
        LineDelimiter::None => None,
    }?;
    Some((index, index + delimiter_length))
}

impl<R: Read> Iterator for FixedRows<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let record = match self.next_record() {
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Err(error) => {
                    self.finished = true;
                    return Some(Err(error));
                }
                Ok(Some(record)) => record,
            };
            let location = self.current_location();
            self.line += 1;
            if record.is_empty() {
                continue;
            }
            if self.rows_to_skip > 0 {
                self.rows_to_skip -= 1;
                continue;
            }
            return Some(Ok(Row::new(self.split_cells(&record), location)));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icd_model::ErrorKind;

    fn fixed_rows(input: &[u8], delimiter: LineDelimiter, header: usize) -> FixedRows<&[u8]> {
        let input = DecodingReader::new(input, encoding_rs::UTF_8, "data.txt");
        FixedRows::new(input, "data.txt", vec![3, 2], delimiter, header)
    }

    fn rows(text: &str, delimiter: LineDelimiter) -> Vec<Result<Row>> {
        fixed_rows(text.as_bytes(), delimiter, 0).collect()
    }

    #[test]
    fn cuts_cells_by_width() {
        let rows = rows("abc12\r\ndef34\n", LineDelimiter::Any);
        assert_eq!(rows.len(), 2);
        let second = rows[1].as_ref().expect("row");
        assert_eq!(second.cells, vec!["def", "34"]);
        assert_eq!(second.location.line(), 1);
    }

    #[test]
    fn short_and_long_lines_keep_their_shape() {
        let rows = rows("ab\nabc12xyz\n", LineDelimiter::Lf);
        assert_eq!(rows[0].as_ref().unwrap().cells, vec!["ab"]);
        assert_eq!(rows[1].as_ref().unwrap().cells, vec!["abc", "12", "xyz"]);
    }

    #[test]
    fn records_without_delimiter() {
        let rows = rows("abc12def34", LineDelimiter::None);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].as_ref().unwrap().cells, vec!["def", "34"]);
    }

    #[test]
    fn truncated_record_without_delimiter_fails() {
        let rows = rows("abc12de", LineDelimiter::None);
        assert_eq!(rows.len(), 2);
        let error = rows[1].as_ref().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DataFormatValue);
    }

    #[test]
    fn skips_header_and_blank_lines() {
        let rows: Vec<Row> = fixed_rows(b"NAMAG\n\nabc12\n", LineDelimiter::Any, 1)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].location.line(), 2);
    }

    #[test]
    fn crlf_split_across_chunks_is_one_delimiter() {
        // The CR of line 1170 is the last byte of the first decoded chunk.
        let text = format!("ab\n{}de", "abc12\r\n".repeat(1170));
        let rows: Vec<Row> = rows(&text, LineDelimiter::Any)
            .into_iter()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 1172);
        assert_eq!(rows[1170].cells, vec!["abc", "12"]);
        assert_eq!(rows[1171].cells, vec!["de"]);
        assert_eq!(rows[1171].location.line(), 1171);
    }

    #[test]
    fn rows_before_broken_bytes_are_kept() {
        let rows: Vec<Result<Row>> =
            fixed_rows(b"abc12\ndef34\ngh\xff", LineDelimiter::Lf, 0).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].as_ref().unwrap().cells, vec!["def", "34"]);
        let error = rows[2].as_ref().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnicodeDecode);
        assert_eq!(error.location().map(Location::line), Some(2));
    }
}
