//! Row source for ICD definition files.
//!
//! ICDs are delimited UTF-8 files. The item delimiter is detected from the
//! first non-blank line so ICDs exported with `,`, `;`, tab or `|` all work.

use std::io::Cursor;
use std::path::Path;

use icd_model::{IcdError, Result};
use tracing::debug;

use crate::decode::{ZIP_SIGNATURE, decode, read_bytes};
use crate::delimited::{DelimitedOptions, DelimitedRows, delimited_rows_from_str};

/// Item delimiters considered when sniffing an ICD.
pub const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Most frequent candidate delimiter outside of quotes in the first
/// non-blank line, `,` if none occurs.
pub fn sniff_item_delimiter(text: &str) -> char {
    let Some(line) = text.lines().find(|line| !line.trim().is_empty()) else {
        return ',';
    };
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for character in line.chars() {
        if character == '"' {
            in_quotes = !in_quotes;
        } else if !in_quotes
            && let Some(index) = CANDIDATE_DELIMITERS.iter().position(|c| *c == character)
        {
            counts[index] += 1;
        }
    }
    counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .max_by(|(left_index, left), (right_index, right)| {
            left.cmp(right).then(right_index.cmp(left_index))
        })
        .map_or(',', |(index, _)| CANDIDATE_DELIMITERS[index])
}

/// ICD rows over already decoded text.
pub fn icd_rows_from_str(source_id: &str, text: &str) -> Result<DelimitedRows<Cursor<Vec<u8>>>> {
    let options = DelimitedOptions::default().with_item_delimiter(sniff_item_delimiter(text));
    delimited_rows_from_str(source_id, text, &options)
}

/// Open the ICD at `path`.
pub fn read_icd_rows(path: &Path) -> Result<DelimitedRows<Cursor<Vec<u8>>>> {
    let bytes = read_bytes(path)?;
    if bytes.starts_with(ZIP_SIGNATURE) {
        return Err(IcdError::data_format_syntax(format!(
            "ICD must be a delimited text file but {} is a zipped spreadsheet",
            path.display()
        )));
    }
    let source_id = path.to_string_lossy();
    let text = decode(&bytes, encoding_rs::UTF_8, &source_id)?;
    let delimiter = sniff_item_delimiter(&text);
    debug!(path = %path.display(), delimiter = ?delimiter, "reading ICD");
    delimited_rows_from_str(
        &source_id,
        &text,
        &DelimitedOptions::default().with_item_delimiter(delimiter),
    )
}
