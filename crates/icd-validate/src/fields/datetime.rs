use chrono::{NaiveDate, NaiveDateTime};
use icd_model::{DataFormat, IcdError, Result, Value};

use super::{FieldFormat, FieldSpec};

pub const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD";

/// Human readable placeholders and their chrono counterparts, longest first.
const PLACEHOLDERS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("hh", "%H"),
    ("mm", "%M"),
    ("ss", "%S"),
];

/// Dates and timestamps described by a human format such as `DD.MM.YYYY hh:mm`.
///
/// Formats with a time part yield [`Value::DateTime`], others [`Value::Date`].
#[derive(Debug, Clone)]
pub struct DateTimeFieldFormat {
    spec: FieldSpec,
    human_format: String,
    chrono_format: String,
    has_time: bool,
}

impl DateTimeFieldFormat {
    pub fn new(spec: FieldSpec) -> Result<Self> {
        let human_format = match spec.rule.trim() {
            "" => DEFAULT_DATE_FORMAT.to_string(),
            rule => rule.to_string(),
        };
        let (chrono_format, placeholders) = translate(&human_format);
        let has = |placeholder: &str| placeholders.iter().any(|used| *used == placeholder);
        if !(has("YYYY") || has("YY")) || !has("MM") || !has("DD") {
            return Err(spec.rule_error(format!(
                "date format must contain year (YYYY or YY), month (MM) and day (DD) \
                 but is {human_format:?}"
            )));
        }
        let has_time = has("hh") || has("mm") || has("ss");
        Ok(Self {
            spec,
            human_format,
            chrono_format,
            has_time,
        })
    }

    pub fn create(spec: FieldSpec, _data_format: &DataFormat) -> Result<Box<dyn FieldFormat>> {
        Ok(Box::new(Self::new(spec)?))
    }

    pub fn human_format(&self) -> &str {
        &self.human_format
    }
}

/// Chrono format for `human_format` and the placeholders it uses.
fn translate(human_format: &str) -> (String, Vec<&'static str>) {
    let mut chrono_format = String::with_capacity(human_format.len() * 2);
    let mut placeholders = Vec::new();
    let mut rest = human_format;
    'scan: while let Some(character) = rest.chars().next() {
        for (placeholder, directive) in PLACEHOLDERS {
            if let Some(after) = rest.strip_prefix(placeholder) {
                chrono_format.push_str(directive);
                placeholders.push(*placeholder);
                rest = after;
                continue 'scan;
            }
        }
        if character == '%' {
            chrono_format.push_str("%%");
        } else {
            chrono_format.push(character);
        }
        rest = &rest[character.len_utf8()..];
    }
    (chrono_format, placeholders)
}

impl FieldFormat for DateTimeFieldFormat {
    fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    fn validate(&self, raw: &str) -> Result<Value> {
        let parsed = if self.has_time {
            NaiveDateTime::parse_from_str(raw, &self.chrono_format).map(Value::DateTime)
        } else {
            NaiveDate::parse_from_str(raw, &self.chrono_format).map(Value::Date)
        };
        parsed.map_err(|error| {
            IcdError::field_value(format!(
                "date must match format {} but is {raw:?}: {error}",
                self.human_format
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icd_model::ErrorKind;

    fn field(rule: &str) -> Result<DateTimeFieldFormat> {
        DateTimeFieldFormat::new(FieldSpec::new("born", "DateTime").with_rule(rule))
    }

    #[test]
    fn default_format_is_iso_date() {
        let field = field("").unwrap();
        assert_eq!(
            field.validated("2024-02-29").unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        let error = field.validated("2023-02-29").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FieldValue);
    }

    #[test]
    fn parses_time_parts() {
        let field = field("DD.MM.YYYY hh:mm").unwrap();
        let expected = NaiveDate::from_ymd_opt(2021, 7, 1)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();
        assert_eq!(field.validated("01.07.2021 13:45").unwrap(), Value::DateTime(expected));
    }

    #[test]
    fn translates_literals() {
        let (format, placeholders) = translate("YYYY%MM/DDx");
        assert_eq!(format, "%Y%%%m/%dx");
        assert_eq!(placeholders, vec!["YYYY", "MM", "DD"]);
    }

    #[test]
    fn rejects_incomplete_formats() {
        let error = field("hh:mm").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FieldSyntax);
    }
}
