use icd_model::{DataFormat, ErrorKind, IcdError, Range, Result, Value};

use super::{FieldFormat, FieldSpec};

/// Whole numbers, optionally limited by a range rule such as `0...150`.
#[derive(Debug, Clone)]
pub struct IntegerFieldFormat {
    spec: FieldSpec,
    range: Option<Range>,
}

impl IntegerFieldFormat {
    pub fn new(spec: FieldSpec) -> Result<Self> {
        let range = Range::parse(&format!("rule for field {:?}", spec.name), &spec.rule)?;
        Ok(Self { spec, range })
    }

    pub fn create(spec: FieldSpec, _data_format: &DataFormat) -> Result<Box<dyn FieldFormat>> {
        Ok(Box::new(Self::new(spec)?))
    }

    pub fn range(&self) -> Option<&Range> {
        self.range.as_ref()
    }
}

impl FieldFormat for IntegerFieldFormat {
    fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    fn validate(&self, raw: &str) -> Result<Value> {
        let value: i64 = raw.trim().parse().map_err(|_| {
            IcdError::field_value(format!("value must be an integer number but is {raw:?}"))
        })?;
        if let Some(range) = &self.range {
            range
                .validate("value", value)
                .map_err(|error| error.reclassify(ErrorKind::FieldValue))?;
        }
        Ok(Value::Integer(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(rule: &str) -> IntegerFieldFormat {
        IntegerFieldFormat::new(FieldSpec::new("age", "Integer").with_rule(rule)).unwrap()
    }

    #[test]
    fn accepts_values_in_range() {
        let field = field("0...150");
        assert_eq!(field.validated("42").unwrap(), Value::Integer(42));
        assert_eq!(field.validated("0").unwrap(), Value::Integer(0));
    }

    #[test]
    fn rejects_values_out_of_range() {
        let error = field("0...150").validated("200").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FieldValue);
        assert!(error.message().contains("200"), "{error}");
    }

    #[test]
    fn rejects_non_numbers() {
        for raw in ["abc", "1.5", "12x"] {
            let error = field("").validated(raw).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::FieldValue, "{raw}");
        }
    }

    #[test]
    fn broken_rule_is_a_range_syntax_error() {
        let error = IntegerFieldFormat::new(FieldSpec::new("age", "Integer").with_rule("5...1"))
            .expect_err("broken range");
        assert_eq!(error.kind(), ErrorKind::RangeSyntax);
    }
}
