use icd_model::{DataFormat, IcdError, Result, Value};
use regex::Regex;

use super::{FieldFormat, FieldSpec};

/// Text matching a glob like `???-*`; `?` is any character, `*` any sequence.
#[derive(Debug, Clone)]
pub struct PatternFieldFormat {
    spec: FieldSpec,
    regex: Regex,
}

impl PatternFieldFormat {
    pub fn new(spec: FieldSpec) -> Result<Self> {
        if spec.rule.is_empty() {
            return Err(spec.rule_error("pattern must not be empty"));
        }
        let regex = compile(&spec, &glob_to_regex(&spec.rule))?;
        Ok(Self { spec, regex })
    }

    pub fn create(spec: FieldSpec, _data_format: &DataFormat) -> Result<Box<dyn FieldFormat>> {
        Ok(Box::new(Self::new(spec)?))
    }
}

impl FieldFormat for PatternFieldFormat {
    fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    fn validate(&self, raw: &str) -> Result<Value> {
        matched(&self.regex, raw, || format!("pattern {:?}", self.spec.rule))
    }
}

/// Text the regular expression in the rule matches as a whole.
#[derive(Debug, Clone)]
pub struct RegExFieldFormat {
    spec: FieldSpec,
    regex: Regex,
}

impl RegExFieldFormat {
    pub fn new(spec: FieldSpec) -> Result<Self> {
        if spec.rule.is_empty() {
            return Err(spec.rule_error("regular expression must not be empty"));
        }
        let regex = compile(&spec, &format!("^(?:{})$", spec.rule))?;
        Ok(Self { spec, regex })
    }

    pub fn create(spec: FieldSpec, _data_format: &DataFormat) -> Result<Box<dyn FieldFormat>> {
        Ok(Box::new(Self::new(spec)?))
    }
}

impl FieldFormat for RegExFieldFormat {
    fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    fn validate(&self, raw: &str) -> Result<Value> {
        matched(&self.regex, raw, || {
            format!("regular expression {:?}", self.spec.rule)
        })
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut pattern = String::from("^");
    let mut buffer = [0u8; 4];
    for character in glob.chars() {
        match character {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => pattern.push_str(&regex::escape(character.encode_utf8(&mut buffer))),
        }
    }
    pattern.push('$');
    pattern
}

fn compile(spec: &FieldSpec, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|error| spec.rule_error(&error).with_cause(error))
}

fn matched(regex: &Regex, raw: &str, describe: impl FnOnce() -> String) -> Result<Value> {
    if regex.is_match(raw) {
        Ok(Value::Text(raw.to_string()))
    } else {
        Err(IcdError::field_value(format!(
            "value {raw:?} must match {}",
            describe()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icd_model::ErrorKind;

    #[test]
    fn glob_matches_whole_value() {
        let spec = FieldSpec::new("code", "Pattern").with_rule("A?-*.txt");
        let field = PatternFieldFormat::new(spec).unwrap();
        assert!(field.validated("A1-report.txt").is_ok());
        assert!(field.validated("A1-report.txt.bak").is_err());
        assert!(field.validated("A1-reportxtxt").is_err());
    }

    #[test]
    fn regex_matches_whole_value() {
        let spec = FieldSpec::new("zip", "RegEx").with_rule(r"\d{4}|\d{5}");
        let field = RegExFieldFormat::new(spec).unwrap();
        assert!(field.validated("1234").is_ok());
        assert!(field.validated("12345").is_ok());
        let error = field.validated("123456").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FieldValue);
    }

    #[test]
    fn broken_regex_is_a_field_syntax_error() {
        let error =
            RegExFieldFormat::new(FieldSpec::new("zip", "RegEx").with_rule("(")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FieldSyntax);
        assert!(error.cause().is_some());
    }
}
