//! Integer ranges as declared in ICD rules, for example `1...10, 20...`.

use std::fmt;

use serde::Serialize;

use crate::error::{IcdError, Result};

/// Symbolic names that can replace character codes in ICD texts.
pub const NAME_TO_ASCII_CODE: &[(&str, u32)] = &[
    ("cr", 13),
    ("ff", 12),
    ("lf", 10),
    ("tab", 9),
    ("vt", 11),
];

/// ASCII code for a symbolic name such as `tab`.
pub fn ascii_code_for_name(name: &str) -> Option<u32> {
    let name = name.trim().to_lowercase();
    NAME_TO_ASCII_CODE
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, code)| *code)
}

const ELLIPSIS: &str = "...";

/// A single `lower...upper` item; either limit may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeItem {
    pub lower: Option<i64>,
    pub upper: Option<i64>,
}

impl RangeItem {
    pub fn contains(&self, value: i64) -> bool {
        self.lower.is_none_or(|lower| value >= lower)
            && self.upper.is_none_or(|upper| value <= upper)
    }
}

impl fmt::Display for RangeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower, self.upper) {
            (Some(lower), Some(upper)) if lower == upper => write!(f, "{lower}"),
            (lower, upper) => {
                if let Some(lower) = lower {
                    write!(f, "{lower}")?;
                }
                f.write_str(ELLIPSIS)?;
                if let Some(upper) = upper {
                    write!(f, "{upper}")?;
                }
                Ok(())
            }
        }
    }
}

/// Union of [`RangeItem`]s. A value is valid if any item contains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Range {
    items: Vec<RangeItem>,
}

impl Range {
    /// Parse `text`; empty text yields `None`, meaning "no restriction".
    ///
    /// `description` names what the range is for and shows up in errors.
    pub fn parse(description: &str, text: &str) -> Result<Option<Self>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let mut items = Vec::new();
        for item_text in text.split(',') {
            let item_text = item_text.trim();
            if item_text.is_empty() {
                return Err(IcdError::range_syntax(format!(
                    "{description} must not contain empty items: {text:?}"
                )));
            }
            items.push(parse_item(description, item_text)?);
        }
        Ok(Some(Self { items }))
    }

    /// Range containing exactly `value`.
    pub fn exact(value: i64) -> Self {
        Self {
            items: vec![RangeItem {
                lower: Some(value),
                upper: Some(value),
            }],
        }
    }

    pub fn items(&self) -> &[RangeItem] {
        &self.items
    }

    pub fn contains(&self, value: i64) -> bool {
        self.items.iter().any(|item| item.contains(value))
    }

    /// Fail with `RangeValue` unless `value` is within the range.
    pub fn validate(&self, name: &str, value: i64) -> Result<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(IcdError::range_value(format!(
                "{name} is {value} but must be within range: {self}"
            )))
        }
    }

    /// The single value of a range like `5` or `5...5`.
    pub fn exact_value(&self) -> Option<i64> {
        match self.items.as_slice() {
            [RangeItem {
                lower: Some(lower),
                upper: Some(upper),
            }] if lower == upper => Some(*lower),
            _ => None,
        }
    }

    /// Smallest lower limit, `None` if any item is open downwards.
    pub fn lower_limit(&self) -> Option<i64> {
        self.items
            .iter()
            .map(|item| item.lower)
            .collect::<Option<Vec<_>>>()
            .and_then(|limits| limits.into_iter().min())
    }

    /// Largest upper limit, `None` if any item is open upwards.
    pub fn upper_limit(&self) -> Option<i64> {
        self.items
            .iter()
            .map(|item| item.upper)
            .collect::<Option<Vec<_>>>()
            .and_then(|limits| limits.into_iter().max())
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, item) in self.items.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

fn parse_item(description: &str, text: &str) -> Result<RangeItem> {
    let item = match text.find(ELLIPSIS) {
        Some(index) => {
            let lower_text = text[..index].trim();
            let upper_text = text[index + ELLIPSIS.len()..].trim();
            if upper_text.contains(ELLIPSIS) {
                return Err(IcdError::range_syntax(format!(
                    "{description} item must contain at most one {ELLIPSIS:?}: {text:?}"
                )));
            }
            if lower_text.is_empty() && upper_text.is_empty() {
                return Err(IcdError::range_syntax(format!(
                    "{description} item must specify at least one limit: {text:?}"
                )));
            }
            RangeItem {
                lower: optional_limit(description, lower_text)?,
                upper: optional_limit(description, upper_text)?,
            }
        }
        None => {
            let value = parse_limit(description, text)?;
            RangeItem {
                lower: Some(value),
                upper: Some(value),
            }
        }
    };
    if let (Some(lower), Some(upper)) = (item.lower, item.upper)
        && lower > upper
    {
        return Err(IcdError::range_syntax(format!(
            "{description} lower limit {lower} must not be greater than upper limit {upper}"
        )));
    }
    Ok(item)
}

fn optional_limit(description: &str, text: &str) -> Result<Option<i64>> {
    if text.is_empty() {
        Ok(None)
    } else {
        parse_limit(description, text).map(Some)
    }
}

/// A decimal or hex number, a quoted character or a symbolic name.
fn parse_limit(description: &str, text: &str) -> Result<i64> {
    let invalid = || {
        IcdError::range_syntax(format!(
            "{description} limit must be a number, a quoted character or a symbolic name \
             but is: {text:?}"
        ))
    };
    if let Some(code) = ascii_code_for_name(text) {
        return Ok(i64::from(code));
    }
    if let Some(quoted) = text.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')) {
        let mut chars = quoted.chars();
        return match (chars.next(), chars.next()) {
            (Some(only), None) => Ok(i64::from(u32::from(only))),
            _ => Err(invalid()),
        };
    }
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    }
    .map_err(|_| invalid())?;
    Ok(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parsed(text: &str) -> Range {
        Range::parse("test", text)
            .expect("valid range")
            .expect("non empty range")
    }

    #[test]
    fn empty_text_means_unrestricted() {
        assert_eq!(Range::parse("test", "  ").unwrap(), None);
    }

    #[test]
    fn parses_closed_and_open_items() {
        let range = parsed("0...150");
        assert!(range.contains(0));
        assert!(range.contains(150));
        assert!(!range.contains(151));
        assert!(!range.contains(-1));

        let open = parsed("...-3, 10...");
        assert!(open.contains(-100));
        assert!(!open.contains(0));
        assert!(open.contains(1_000_000));
        assert_eq!(open.lower_limit(), None);
    }

    #[test]
    fn parses_characters_and_names() {
        let range = parsed("tab, 32...126, 'ä', 0x2028");
        assert!(range.contains(9));
        assert!(range.contains(i64::from(u32::from('a'))));
        assert!(range.contains(i64::from(u32::from('ä'))));
        assert!(range.contains(0x2028));
        assert!(!range.contains(10));
    }

    #[test]
    fn exact_values() {
        assert_eq!(parsed("5").exact_value(), Some(5));
        assert_eq!(parsed("5...5").exact_value(), Some(5));
        assert_eq!(parsed("1...5").exact_value(), None);
        assert_eq!(Range::exact(3).to_string(), "3");
    }

    #[test]
    fn rejects_broken_syntax() {
        for text in ["1...x", "...", "1..., ,2", "5...1", "1...2...3", "'ab'"] {
            let error = Range::parse("test", text).expect_err(text);
            assert_eq!(error.kind(), ErrorKind::RangeSyntax, "{text}");
        }
    }

    #[test]
    fn validate_reports_range() {
        let error = parsed("0...150").validate("age", 200).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RangeValue);
        assert_eq!(error.to_string(), "age is 200 but must be within range: 0...150");
    }

    #[test]
    fn limits_span_all_items() {
        let range = parsed("3...5, 1...2, 9");
        assert_eq!(range.lower_limit(), Some(1));
        assert_eq!(range.upper_limit(), Some(9));
    }
}
