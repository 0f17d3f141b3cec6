//! Decoding raw input bytes into text.
//!
//! Data files are decoded while they are read: [`DecodingReader`] turns a
//! byte stream in any supported encoding into UTF-8 chunk by chunk, so rows
//! before a broken character are still produced.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use encoding_rs::{Decoder, DecoderResult, Encoding};
use icd_model::{IcdError, Location, Result};

/// Signature of zip containers such as ODS or XLSX files.
pub const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Number of raw bytes decoded at once.
const CHUNK_SIZE: usize = 8 * 1024;

/// Read a whole file; the handle is closed before this returns.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|error| cannot_read(path, error))
}

pub(crate) fn cannot_read(path: &Path, error: io::Error) -> IcdError {
    IcdError::data_format_value(format!("cannot read {}: {error}", path.display()))
        .with_cause(error)
}

/// Incremental decoder over a byte stream.
///
/// A leading byte order mark of the declared encoding is dropped. Malformed
/// input fails with `UnicodeDecode`, located at the line and column of the
/// first broken character, after all text before it has been handed out.
pub struct DecodingReader<R> {
    inner: R,
    decoder: Decoder,
    encoding: &'static Encoding,
    source_id: String,
    line: usize,
    column: usize,
    failure: Option<IcdError>,
    finished: bool,
    /// Decoded text not yet consumed through [`Read`].
    pending: String,
    offset: usize,
}

impl<R: Read> DecodingReader<R> {
    pub fn new(inner: R, encoding: &'static Encoding, source_id: &str) -> Self {
        Self {
            inner,
            decoder: encoding.new_decoder_with_bom_removal(),
            encoding,
            source_id: source_id.to_string(),
            line: 0,
            column: 0,
            failure: None,
            finished: false,
            pending: String::new(),
            offset: 0,
        }
    }

    /// Append the next chunk of decoded text to `text`.
    ///
    /// Returns the number of bytes appended; `0` means the input is
    /// exhausted.
    pub fn read_text(&mut self, text: &mut String) -> Result<usize> {
        if let Some(failure) = self.failure.take() {
            self.finished = true;
            return Err(failure);
        }
        let start = text.len();
        let mut raw = [0u8; CHUNK_SIZE];
        while !self.finished && text.len() == start {
            let count = loop {
                match self.inner.read(&mut raw) {
                    Ok(count) => break count,
                    Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                    Err(error) => {
                        self.finished = true;
                        return Err(IcdError::data_format_value(format!(
                            "cannot read {}: {error}",
                            self.source_id
                        ))
                        .with_cause(error));
                    }
                }
            };
            let last = count == 0;
            let mut input = &raw[..count];
            loop {
                let needed = self
                    .decoder
                    .max_utf8_buffer_length_without_replacement(input.len())
                    .unwrap_or(CHUNK_SIZE * 4);
                text.reserve(needed);
                let (result, read) =
                    self.decoder
                        .decode_to_string_without_replacement(input, text, last);
                input = &input[read..];
                match result {
                    DecoderResult::InputEmpty => break,
                    DecoderResult::OutputFull => {}
                    DecoderResult::Malformed(_, _) => {
                        self.advance(&text[start..]);
                        let failure = self.malformed();
                        self.finished = true;
                        if text.len() == start {
                            return Err(failure);
                        }
                        self.failure = Some(failure);
                        return Ok(text.len() - start);
                    }
                }
            }
            if last {
                self.finished = true;
            }
        }
        self.advance(&text[start..]);
        Ok(text.len() - start)
    }

    fn advance(&mut self, text: &str) {
        for character in text.chars() {
            if character == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
    }

    fn malformed(&self) -> IcdError {
        let mut location = Location::new(self.source_id.as_str()).with_column();
        if self.line > 0 {
            location.advance_line(self.line);
        }
        if self.column > 0 {
            location.advance_column(self.column);
        }
        IcdError::unicode_decode(format!(
            "cannot decode input using encoding {}",
            self.encoding.name()
        ))
        .at(&location)
    }
}

impl<R: Read> Read for DecodingReader<R> {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        while self.offset == self.pending.len() {
            let mut text = std::mem::take(&mut self.pending);
            text.clear();
            self.offset = 0;
            let result = self.read_text(&mut text);
            self.pending = text;
            match result {
                Ok(0) => return Ok(0),
                Ok(_) => {}
                Err(error) => return Err(io::Error::new(io::ErrorKind::InvalidData, error)),
            }
        }
        let available = &self.pending.as_bytes()[self.offset..];
        let count = available.len().min(buffer.len());
        buffer[..count].copy_from_slice(&available[..count]);
        self.offset += count;
        Ok(count)
    }
}

/// Turn an I/O error raised while reading through a [`DecodingReader`] back
/// into the error that caused it.
pub(crate) fn read_error(error: io::Error, location: &Location) -> IcdError {
    if !error.get_ref().is_some_and(|inner| inner.is::<IcdError>()) {
        return IcdError::data_format_value(format!("cannot read data: {error}"))
            .at(location)
            .with_cause(error);
    }
    match error.into_inner().map(|inner| inner.downcast::<IcdError>()) {
        Some(Ok(cause)) => *cause,
        _ => IcdError::data_format_value("cannot read data").at(location),
    }
}

/// Decode all of `bytes` with `encoding`.
pub fn decode(bytes: &[u8], encoding: &'static Encoding, source_id: &str) -> Result<String> {
    let mut reader = DecodingReader::new(bytes, encoding, source_id);
    let mut text = String::with_capacity(bytes.len());
    while reader.read_text(&mut text)? > 0 {}
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use icd_model::ErrorKind;

    #[test]
    fn decodes_latin1() {
        let text = decode(b"gr\xfc\xdf", encoding_rs::WINDOWS_1252, "mem").unwrap();
        assert_eq!(text, "grüß");
    }

    #[test]
    fn strips_utf8_bom() {
        let text = decode(b"\xef\xbb\xbfid", encoding_rs::UTF_8, "mem").unwrap();
        assert_eq!(text, "id");
    }

    #[test]
    fn locates_broken_utf8() {
        let error = decode(b"ok\nab\xff", encoding_rs::UTF_8, "data.csv").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnicodeDecode);
        let location = error.location().expect("location");
        assert_eq!(location.line(), 1);
        assert_eq!(location.column(), 2);
    }

    #[test]
    fn hands_out_text_before_broken_bytes() {
        let mut input = "a,b\n".repeat(3000).into_bytes();
        input.extend_from_slice(b"x,\xff\n");
        let mut reader = DecodingReader::new(input.as_slice(), encoding_rs::UTF_8, "data.csv");
        let mut text = String::new();
        let error = loop {
            match reader.read_text(&mut text) {
                Ok(0) => panic!("broken input must fail"),
                Ok(_) => {}
                Err(error) => break error,
            }
        };
        assert_eq!(text.len(), 3000 * 4 + 2);
        assert_eq!(error.location().map(Location::line), Some(3000));
    }

    #[test]
    fn multibyte_characters_survive_chunk_borders() {
        let text = "ä".repeat(CHUNK_SIZE);
        let mut decoded = String::new();
        DecodingReader::new(text.as_bytes(), encoding_rs::UTF_8, "mem")
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, text);
    }

    #[test]
    fn read_errors_keep_the_decoding_error() {
        let mut reader = DecodingReader::new(&b"\xff"[..], encoding_rs::UTF_8, "data.csv");
        let error = reader.read(&mut [0u8; 16]).unwrap_err();
        let error = read_error(error, &Location::new("data.csv"));
        assert_eq!(error.kind(), ErrorKind::UnicodeDecode);
    }
}
