use icd_model::{DataFormat, IcdError, Result, Value};

use super::{FieldFormat, FieldSpec};

/// The value must equal the rule; an empty rule means the field is always empty.
#[derive(Debug, Clone)]
pub struct ConstantFieldFormat {
    spec: FieldSpec,
}

impl ConstantFieldFormat {
    pub fn new(spec: FieldSpec) -> Result<Self> {
        if spec.rule.is_empty() && !spec.allow_empty {
            return Err(spec.rule_error(
                "constant field with empty rule must be allowed to be empty",
            ));
        }
        Ok(Self { spec })
    }

    pub fn create(spec: FieldSpec, _data_format: &DataFormat) -> Result<Box<dyn FieldFormat>> {
        Ok(Box::new(Self::new(spec)?))
    }
}

impl FieldFormat for ConstantFieldFormat {
    fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    fn validate(&self, raw: &str) -> Result<Value> {
        if raw == self.spec.rule {
            Ok(Value::Text(raw.to_string()))
        } else {
            Err(IcdError::field_value(format!(
                "value is {raw:?} but must be {:?}",
                self.spec.rule
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icd_model::ErrorKind;

    #[test]
    fn accepts_only_the_constant() {
        let field = ConstantFieldFormat::new(FieldSpec::new("version", "Constant").with_rule("2"))
            .unwrap();
        assert!(field.validated("2").is_ok());
        assert_eq!(field.validated("3").unwrap_err().kind(), ErrorKind::FieldValue);
    }

    #[test]
    fn empty_constant_requires_empty_values() {
        let spec = FieldSpec::new("filler", "Constant");
        let error = ConstantFieldFormat::new(spec.clone()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FieldSyntax);

        let field = ConstantFieldFormat::new(spec.with_allow_empty(true)).unwrap();
        assert_eq!(field.validated("").unwrap(), Value::Empty);
        assert!(field.validated("x").is_err());
    }
}
