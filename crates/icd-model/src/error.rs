//! Error model shared by every ICD crate.
//!
//! An [`IcdError`] is an immutable value: the locations it refers to are
//! snapshots taken when the error was built, so readers can keep advancing
//! their own location afterwards.

use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::location::Location;

/// Kind of an [`IcdError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Broken range declaration, for example `1...x`.
    RangeSyntax,
    /// Value outside of a declared range.
    RangeValue,
    /// Data violates the declared data format.
    DataFormatValue,
    /// Broken data format declaration.
    DataFormatSyntax,
    /// Value does not match its field format.
    FieldValue,
    /// Unknown field name or field type.
    FieldLookup,
    /// Broken field declaration.
    FieldSyntax,
    /// Broken check declaration.
    CheckSyntax,
    /// Data violates a check.
    CheckError,
    /// Broken ICD row, for example an unknown row marker.
    CidSyntax,
    /// Input cannot be decoded with the declared encoding.
    UnicodeDecode,
}

/// How far an error of a certain kind reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorScope {
    /// Raised while reading the ICD; the document cannot be used.
    Definition,
    /// Raised while validating a single row; the row is rejected.
    Row,
    /// The data stream itself is broken; validation stops.
    Pass,
}

impl ErrorKind {
    pub fn scope(self) -> ErrorScope {
        match self {
            Self::RangeSyntax
            | Self::DataFormatSyntax
            | Self::FieldLookup
            | Self::FieldSyntax
            | Self::CheckSyntax
            | Self::CidSyntax => ErrorScope::Definition,
            Self::RangeValue | Self::FieldValue | Self::CheckError => ErrorScope::Row,
            Self::DataFormatValue | Self::UnicodeDecode => ErrorScope::Pass,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::RangeSyntax => "range syntax",
            Self::RangeValue => "range value",
            Self::DataFormatValue => "data format value",
            Self::DataFormatSyntax => "data format syntax",
            Self::FieldValue => "field value",
            Self::FieldLookup => "field lookup",
            Self::FieldSyntax => "field syntax",
            Self::CheckSyntax => "check syntax",
            Self::CheckError => "check",
            Self::CidSyntax => "ICD syntax",
            Self::UnicodeDecode => "unicode decode",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Secondary message pointing at a related location, for example the first
/// declaration of a field that is declared twice.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SeeAlso {
    message: String,
    location: Option<Location>,
}

type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Error raised while reading an ICD or validating data against it.
#[derive(Debug, Error)]
#[error("{}", self.render())]
pub struct IcdError {
    kind: ErrorKind,
    message: String,
    location: Option<Location>,
    see_also: Option<SeeAlso>,
    #[source]
    cause: Option<Cause>,
}

impl IcdError {
    /// # Panics
    ///
    /// Panics if `message` is empty.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        assert!(!message.is_empty(), "error message must not be empty");
        Self {
            kind,
            message,
            location: None,
            see_also: None,
            cause: None,
        }
    }

    pub fn range_syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeSyntax, message)
    }

    pub fn range_value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeValue, message)
    }

    pub fn data_format_value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataFormatValue, message)
    }

    pub fn data_format_syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataFormatSyntax, message)
    }

    pub fn field_value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FieldValue, message)
    }

    pub fn field_lookup(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FieldLookup, message)
    }

    pub fn field_syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FieldSyntax, message)
    }

    pub fn check_syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CheckSyntax, message)
    }

    pub fn check(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CheckError, message)
    }

    pub fn cid_syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CidSyntax, message)
    }

    pub fn unicode_decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnicodeDecode, message)
    }

    /// Attach a snapshot of `location`.
    #[must_use]
    pub fn at(mut self, location: &Location) -> Self {
        self.location = Some(location.clone());
        self
    }

    /// Attach `location` unless the error already has one.
    #[must_use]
    pub fn or_at(self, location: &Location) -> Self {
        if self.location.is_some() {
            self
        } else {
            self.at(location)
        }
    }

    /// # Panics
    ///
    /// Panics if `message` is empty.
    #[must_use]
    pub fn see_also(mut self, message: impl Into<String>, location: Option<&Location>) -> Self {
        let message = message.into();
        assert!(!message.is_empty(), "see also message must not be empty");
        self.see_also = Some(SeeAlso {
            message,
            location: location.cloned(),
        });
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Same error with a different kind, keeping `self` as the cause.
    #[must_use]
    pub fn reclassify(self, kind: ErrorKind) -> Self {
        let mut result = Self::new(kind, self.message.clone());
        result.location = self.location.clone();
        result.see_also = self.see_also.clone();
        result.with_cause(self)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn scope(&self) -> ErrorScope {
        self.kind.scope()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn see_also_location(&self) -> Option<&Location> {
        self.see_also.as_ref().and_then(|see_also| see_also.location.as_ref())
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// The error text without the leading location.
    pub fn detail(&self) -> String {
        let mut result = self.message.clone();
        if let Some(see_also) = &self.see_also {
            result.push_str(" (see also: ");
            if let Some(location) = &see_also.location {
                result.push_str(&format!("{location}: "));
            }
            result.push_str(&see_also.message);
            result.push(')');
        }
        result
    }

    fn render(&self) -> String {
        match &self.location {
            Some(location) => format!("{location}: {}", self.detail()),
            None => self.detail(),
        }
    }
}

/// Result type for ICD operations.
pub type Result<T> = std::result::Result<T, IcdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_message_only() {
        let error = IcdError::field_value("value must be an integer");
        assert_eq!(error.to_string(), "value must be an integer");
    }

    #[test]
    fn renders_location_and_see_also() {
        let mut location = Location::new("icd.csv").with_cell();
        let first = location.clone();
        location.advance_line(4);
        let error = IcdError::field_syntax("field name must be used for only one field: age")
            .at(&location)
            .see_also("first declaration", Some(&first));
        assert_eq!(
            error.to_string(),
            "icd.csv (R5C1): field name must be used for only one field: age \
             (see also: icd.csv (R1C1): first declaration)"
        );
    }

    #[test]
    fn location_is_a_snapshot() {
        let mut location = Location::new("data.csv").with_cell();
        let error = IcdError::check("duplicate").at(&location);
        location.advance_line(10);
        assert_eq!(error.location().map(Location::line), Some(0));
    }

    #[test]
    fn reclassify_keeps_cause() {
        let error = IcdError::range_value("value must be at most 150 but is 200")
            .reclassify(ErrorKind::FieldValue);
        assert_eq!(error.kind(), ErrorKind::FieldValue);
        assert!(error.cause().is_some());
        assert_eq!(error.scope(), ErrorScope::Row);
    }

    #[test]
    fn scopes_follow_kinds() {
        assert_eq!(ErrorKind::CidSyntax.scope(), ErrorScope::Definition);
        assert_eq!(ErrorKind::FieldLookup.scope(), ErrorScope::Definition);
        assert_eq!(ErrorKind::CheckError.scope(), ErrorScope::Row);
        assert_eq!(ErrorKind::UnicodeDecode.scope(), ErrorScope::Pass);
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn empty_message_is_rejected() {
        let _ = IcdError::field_value("");
    }
}
