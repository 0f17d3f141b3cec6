use icd_model::{DataFormat, Result, Value};

use super::{FieldFormat, FieldSpec};

/// Any text; the rule is ignored.
#[derive(Debug, Clone)]
pub struct TextFieldFormat {
    spec: FieldSpec,
}

impl TextFieldFormat {
    pub fn new(spec: FieldSpec) -> Self {
        Self { spec }
    }

    pub fn create(spec: FieldSpec, _data_format: &DataFormat) -> Result<Box<dyn FieldFormat>> {
        Ok(Box::new(Self::new(spec)))
    }
}

impl FieldFormat for TextFieldFormat {
    fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    fn validate(&self, raw: &str) -> Result<Value> {
        Ok(Value::Text(raw.to_string()))
    }
}
