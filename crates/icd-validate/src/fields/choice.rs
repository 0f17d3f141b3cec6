use icd_model::{DataFormat, IcdError, Result, Value};

use super::{FieldFormat, FieldSpec};

/// One of a fixed set of values, e.g. `male, female, "not, specified"`.
#[derive(Debug, Clone)]
pub struct ChoiceFieldFormat {
    spec: FieldSpec,
    choices: Vec<String>,
}

impl ChoiceFieldFormat {
    pub fn new(spec: FieldSpec) -> Result<Self> {
        let choices = parse_choices(&spec.rule).map_err(|message| spec.rule_error(message))?;
        Ok(Self { spec, choices })
    }

    pub fn create(spec: FieldSpec, _data_format: &DataFormat) -> Result<Box<dyn FieldFormat>> {
        Ok(Box::new(Self::new(spec)?))
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

/// Split a comma separated rule; choices may be quoted with `"` or `'`.
fn parse_choices(rule: &str) -> std::result::Result<Vec<String>, String> {
    let mut choices: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut quote = None;
    let mut was_quoted = false;
    let mut push = |current: &mut String, was_quoted: &mut bool| {
        let choice = if *was_quoted {
            std::mem::take(current)
        } else {
            std::mem::take(current).trim().to_string()
        };
        if choice.is_empty() && !*was_quoted {
            return Err("choices must not be empty".to_string());
        }
        if choices.contains(&choice) {
            return Err(format!("choice {choice:?} must be declared only once"));
        }
        choices.push(choice);
        *was_quoted = false;
        Ok(())
    };
    for character in rule.chars() {
        match (quote, character) {
            (Some(open), _) if character == open => quote = None,
            (Some(_), _) => current.push(character),
            (None, '"' | '\'') if current.trim().is_empty() && !was_quoted => {
                current.clear();
                quote = Some(character);
                was_quoted = true;
            }
            (None, ',') => push(&mut current, &mut was_quoted)?,
            (None, _) if was_quoted && !character.is_whitespace() => {
                return Err(format!("unexpected {character:?} after quoted choice"));
            }
            (None, _) if was_quoted => {}
            (None, _) => current.push(character),
        }
    }
    if quote.is_some() {
        return Err("quoted choice must be closed".to_string());
    }
    push(&mut current, &mut was_quoted)?;
    Ok(choices)
}

impl FieldFormat for ChoiceFieldFormat {
    fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    fn validate(&self, raw: &str) -> Result<Value> {
        if self.choices.iter().any(|choice| choice == raw) {
            Ok(Value::Text(raw.to_string()))
        } else {
            Err(IcdError::field_value(format!(
                "value is {raw:?} but must be one of: {}",
                self.choices.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icd_model::ErrorKind;

    #[test]
    fn parses_plain_and_quoted_choices() {
        assert_eq!(
            parse_choices(r#"male, female, "not, specified", ' '"#).unwrap(),
            vec!["male", "female", "not, specified", " "]
        );
    }

    #[test]
    fn rejects_broken_rules() {
        for rule in ["", "a,,b", "a, a", "\"open", "'a' b"] {
            assert!(parse_choices(rule).is_err(), "{rule}");
        }
    }

    #[test]
    fn validates_exact_choice() {
        let field =
            ChoiceFieldFormat::new(FieldSpec::new("gender", "Choice").with_rule("male, female"))
                .unwrap();
        assert_eq!(field.validated("male").unwrap(), Value::Text("male".to_string()));
        let error = field.validated("Male").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FieldValue);
    }
}
