use icd_model::{DataFormat, IcdError, Result, Value};

use super::{FieldFormat, FieldSpec};

/// Decimal numbers using the data format's decimal and thousands separator.
#[derive(Debug, Clone)]
pub struct DecimalFieldFormat {
    spec: FieldSpec,
    decimal_separator: char,
    thousands_separator: Option<char>,
}

impl DecimalFieldFormat {
    pub fn new(
        spec: FieldSpec,
        decimal_separator: char,
        thousands_separator: Option<char>,
    ) -> Result<Self> {
        if !spec.rule.trim().is_empty() {
            return Err(spec.rule_error(format!("rule must be empty but is {:?}", spec.rule)));
        }
        Ok(Self {
            spec,
            decimal_separator,
            thousands_separator,
        })
    }

    pub fn create(spec: FieldSpec, data_format: &DataFormat) -> Result<Box<dyn FieldFormat>> {
        Ok(Box::new(Self::new(
            spec,
            data_format.decimal_separator(),
            data_format.thousands_separator(),
        )?))
    }

    /// `raw` with separators replaced by their plain counterparts.
    fn normalized(&self, raw: &str) -> Option<String> {
        let mut normalized = String::with_capacity(raw.len());
        for character in raw.trim().chars() {
            if Some(character) == self.thousands_separator {
                continue;
            }
            match character {
                _ if character == self.decimal_separator => normalized.push('.'),
                '0'..='9' | '+' | '-' | 'e' | 'E' => normalized.push(character),
                _ => return None,
            }
        }
        Some(normalized)
    }
}

impl FieldFormat for DecimalFieldFormat {
    fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    fn validate(&self, raw: &str) -> Result<Value> {
        self.normalized(raw)
            .and_then(|text| text.parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .map(Value::Decimal)
            .ok_or_else(|| {
                IcdError::field_value(format!(
                    "value must be a decimal number using {:?} as decimal separator but is {raw:?}",
                    self.decimal_separator
                ))
            })
    }
}
