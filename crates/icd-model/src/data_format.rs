//! Data format descriptor: the `d` rows of an ICD.
//!
//! The first `d` row declares the format kind (`d, format, delimited`); every
//! further `d` row sets one property of that kind (`d, item delimiter, ;`).

use std::collections::BTreeMap;
use std::fmt;

use encoding_rs::Encoding;
use serde::Serialize;

use crate::error::{IcdError, Result};
use crate::location::Location;
use crate::range::{Range, ascii_code_for_name};

/// Key of the `d` row that declares the format kind.
pub const FORMAT_KEY: &str = "format";

/// Whether `key` declares the format kind rather than a property.
pub fn is_format_key(key: &str) -> bool {
    normalized_key(key) == FORMAT_KEY
}

fn normalized_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormatKind {
    Delimited,
    Fixed,
    Ods,
    Excel,
}

impl DataFormatKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "delimited" | "csv" => Some(Self::Delimited),
            "fixed" => Some(Self::Fixed),
            "ods" => Some(Self::Ods),
            "excel" | "xls" => Some(Self::Excel),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Delimited => "delimited",
            Self::Fixed => "fixed",
            Self::Ods => "ods",
            Self::Excel => "excel",
        }
    }

    /// Spreadsheet kinds store cells directly and have no text encoding.
    pub fn is_spreadsheet(self) -> bool {
        matches!(self, Self::Ods | Self::Excel)
    }
}

impl fmt::Display for DataFormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How rows are separated in text based formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDelimiter {
    /// Any of CR, LF or CRLF.
    #[default]
    Any,
    Cr,
    Lf,
    CrLf,
    /// Records follow each other without separator (fixed format only).
    None,
}

impl LineDelimiter {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "any" => Some(Self::Any),
            "cr" => Some(Self::Cr),
            "lf" => Some(Self::Lf),
            "crlf" => Some(Self::CrLf),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DataFormatProperty {
    ItemDelimiter,
    LineDelimiter,
    QuoteCharacter,
    EscapeCharacter,
    Encoding,
    AllowedCharacters,
    Header,
    DecimalSeparator,
    ThousandsSeparator,
}

impl DataFormatProperty {
    pub const ALL: [Self; 9] = [
        Self::ItemDelimiter,
        Self::LineDelimiter,
        Self::QuoteCharacter,
        Self::EscapeCharacter,
        Self::Encoding,
        Self::AllowedCharacters,
        Self::Header,
        Self::DecimalSeparator,
        Self::ThousandsSeparator,
    ];

    /// Look up a property by its ICD key; case, `_` and `-` are ignored.
    pub fn parse(key: &str) -> Option<Self> {
        let key = normalized_key(key);
        Self::ALL.into_iter().find(|property| property.key() == key)
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::ItemDelimiter => "item delimiter",
            Self::LineDelimiter => "line delimiter",
            Self::QuoteCharacter => "quote character",
            Self::EscapeCharacter => "escape character",
            Self::Encoding => "encoding",
            Self::AllowedCharacters => "allowed characters",
            Self::Header => "header",
            Self::DecimalSeparator => "decimal separator",
            Self::ThousandsSeparator => "thousands separator",
        }
    }

    pub fn applies_to(self, kind: DataFormatKind) -> bool {
        match self {
            Self::ItemDelimiter | Self::QuoteCharacter | Self::EscapeCharacter => {
                kind == DataFormatKind::Delimited
            }
            Self::LineDelimiter | Self::Encoding => !kind.is_spreadsheet(),
            Self::AllowedCharacters
            | Self::Header
            | Self::DecimalSeparator
            | Self::ThousandsSeparator => true,
        }
    }
}

/// Declared data format with typed property values.
#[derive(Debug, Clone)]
pub struct DataFormat {
    kind: DataFormatKind,
    item_delimiter: char,
    line_delimiter: LineDelimiter,
    quote_character: char,
    escape_character: char,
    encoding: &'static Encoding,
    allowed_characters: Option<Range>,
    header: usize,
    decimal_separator: char,
    thousands_separator: Option<char>,
    assigned: BTreeMap<DataFormatProperty, Assignment>,
}

#[derive(Debug, Clone)]
struct Assignment {
    value: String,
    location: Option<Location>,
}

impl DataFormat {
    pub fn new(kind: DataFormatKind) -> Self {
        Self {
            kind,
            item_delimiter: ',',
            line_delimiter: LineDelimiter::Any,
            quote_character: '"',
            escape_character: '"',
            encoding: encoding_rs::UTF_8,
            allowed_characters: None,
            header: 0,
            decimal_separator: '.',
            thousands_separator: None,
            assigned: BTreeMap::new(),
        }
    }

    /// Create a descriptor from the value of a `d, format, <name>` row.
    pub fn from_name(name: &str) -> Result<Self> {
        DataFormatKind::parse(name).map(Self::new).ok_or_else(|| {
            IcdError::data_format_syntax(format!(
                "data format is {name:?} but must be one of: delimited, fixed, ods, excel"
            ))
        })
    }

    /// Set property `key` to `value`.
    ///
    /// `location` is where the property was declared; it is used to point
    /// back at the first declaration when a property is set twice.
    pub fn set(&mut self, key: &str, value: &str, location: Option<&Location>) -> Result<()> {
        let property = DataFormatProperty::parse(key).ok_or_else(|| {
            IcdError::data_format_syntax(format!(
                "data format property is {key:?} but must be one of: {}",
                property_keys(self.kind)
            ))
        })?;
        if !property.applies_to(self.kind) {
            return Err(IcdError::data_format_syntax(format!(
                "data format property {:?} must not be used with {} format; valid properties: {}",
                property.key(),
                self.kind,
                property_keys(self.kind)
            )));
        }
        if let Some(previous) = self.assigned.get(&property) {
            return Err(IcdError::data_format_syntax(format!(
                "data format property {:?} must be set only once",
                property.key()
            ))
            .see_also(
                format!("first set to {:?}", previous.value),
                previous.location.as_ref(),
            ));
        }
        self.apply(property, value)?;
        self.assigned.insert(
            property,
            Assignment {
                value: value.to_string(),
                location: location.cloned(),
            },
        );
        Ok(())
    }

    fn apply(&mut self, property: DataFormatProperty, value: &str) -> Result<()> {
        match property {
            DataFormatProperty::ItemDelimiter => {
                self.item_delimiter = parse_character(property, value)?;
            }
            DataFormatProperty::QuoteCharacter => {
                self.quote_character = parse_character(property, value)?;
            }
            DataFormatProperty::EscapeCharacter => {
                self.escape_character = parse_character(property, value)?;
            }
            DataFormatProperty::LineDelimiter => {
                let delimiter = LineDelimiter::parse(value)
                    .filter(|delimiter| {
                        *delimiter != LineDelimiter::None || self.kind == DataFormatKind::Fixed
                    })
                    .ok_or_else(|| {
                        IcdError::data_format_syntax(format!(
                            "line delimiter is {value:?} but must be one of: any, cr, lf, crlf{}",
                            if self.kind == DataFormatKind::Fixed { ", none" } else { "" }
                        ))
                    })?;
                self.line_delimiter = delimiter;
            }
            DataFormatProperty::Encoding => {
                self.encoding = Encoding::for_label(value.trim().as_bytes()).ok_or_else(|| {
                    IcdError::data_format_syntax(format!("encoding is unknown: {value:?}"))
                })?;
            }
            DataFormatProperty::AllowedCharacters => {
                self.allowed_characters =
                    Range::parse(property.key(), value).map_err(|error| {
                        IcdError::data_format_syntax(error.message().to_string()).with_cause(error)
                    })?;
            }
            DataFormatProperty::Header => {
                self.header = value.trim().parse::<usize>().map_err(|_| {
                    IcdError::data_format_syntax(format!(
                        "header must be a number of rows greater or equal to 0 but is: {value:?}"
                    ))
                })?;
            }
            DataFormatProperty::DecimalSeparator => {
                let separator = match single_character(value) {
                    Some(separator @ ('.' | ',')) => separator,
                    _ => {
                        return Err(IcdError::data_format_syntax(format!(
                            "decimal separator is {value:?} but must be one of: '.', ','"
                        )));
                    }
                };
                self.ensure_distinct_separators(separator, self.thousands_separator)?;
                self.decimal_separator = separator;
            }
            DataFormatProperty::ThousandsSeparator => {
                let separator = match single_character(value) {
                    None if value.is_empty() => None,
                    Some(separator @ (',' | '.' | ' ' | '\'')) => Some(separator),
                    _ => {
                        return Err(IcdError::data_format_syntax(format!(
                            "thousands separator is {value:?} but must be one of: \
                             ',', '.', ' ', \"'\" or empty"
                        )));
                    }
                };
                self.ensure_distinct_separators(self.decimal_separator, separator)?;
                self.thousands_separator = separator;
            }
        }
        Ok(())
    }

    fn ensure_distinct_separators(&self, decimal: char, thousands: Option<char>) -> Result<()> {
        if thousands == Some(decimal) {
            Err(IcdError::data_format_syntax(format!(
                "decimal separator and thousands separator must be different \
                 but both are {decimal:?}"
            )))
        } else {
            Ok(())
        }
    }

    pub fn kind(&self) -> DataFormatKind {
        self.kind
    }

    pub fn item_delimiter(&self) -> char {
        self.item_delimiter
    }

    pub fn line_delimiter(&self) -> LineDelimiter {
        self.line_delimiter
    }

    pub fn quote_character(&self) -> char {
        self.quote_character
    }

    pub fn escape_character(&self) -> char {
        self.escape_character
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn allowed_characters(&self) -> Option<&Range> {
        self.allowed_characters.as_ref()
    }

    /// Number of leading rows to skip.
    pub fn header(&self) -> usize {
        self.header
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    pub fn thousands_separator(&self) -> Option<char> {
        self.thousands_separator
    }

    /// Properties explicitly set in the ICD, ordered by property.
    pub fn properties(&self) -> impl Iterator<Item = (DataFormatProperty, &str)> {
        self.assigned
            .iter()
            .map(|(property, assignment)| (*property, assignment.value.as_str()))
    }

    /// Fail with `DataFormatValue` if `text` contains characters outside
    /// of the allowed characters; the error location points at the character.
    pub fn validate_characters(&self, text: &str, location: &Location) -> Result<()> {
        let Some(allowed) = &self.allowed_characters else {
            return Ok(());
        };
        for (index, character) in text.chars().enumerate() {
            if !allowed.contains(i64::from(u32::from(character))) {
                let mut location = location.clone();
                if location.has_column() && index > 0 {
                    location.advance_column(index);
                }
                return Err(IcdError::data_format_value(format!(
                    "character {character:?} (code {}) must be an allowed character: {allowed}",
                    u32::from(character)
                ))
                .at(&location));
            }
        }
        Ok(())
    }
}

fn property_keys(kind: DataFormatKind) -> String {
    DataFormatProperty::ALL
        .into_iter()
        .filter(|property| property.applies_to(kind))
        .map(DataFormatProperty::key)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The only character of `value` without surrounding blanks, or the blank
/// itself when `value` is a single blank.
fn single_character(value: &str) -> Option<char> {
    let only = |text: &str| {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    };
    only(value.trim()).or_else(|| only(value))
}

/// A single character or a symbolic name such as `tab`.
fn parse_character(property: DataFormatProperty, value: &str) -> Result<char> {
    if let Some(only) = single_character(value) {
        return Ok(only);
    }
    ascii_code_for_name(value)
        .and_then(char::from_u32)
        .ok_or_else(|| {
            IcdError::data_format_syntax(format!(
                "{} must be a single character or one of cr, ff, lf, tab, vt but is: {value:?}",
                property.key()
            ))
        })
}
