use std::collections::HashMap;

use icd_model::{IcdError, Result, RowValues};

use super::{Check, CheckPass, CheckSpec};

/// Values of the key fields must not repeat across rows.
#[derive(Debug, Clone)]
pub struct IsUniqueCheck {
    spec: CheckSpec,
    key_fields: Vec<String>,
}

impl IsUniqueCheck {
    pub fn new(spec: CheckSpec) -> Result<Self> {
        let mut key_fields: Vec<String> = Vec::new();
        for name in spec.rule.split(',') {
            if name.trim().is_empty() {
                return Err(spec.rule_error(format!(
                    "rule must be a comma separated list of field names but is {:?}",
                    spec.rule
                )));
            }
            let name = spec.field(name)?;
            if key_fields.contains(&name) {
                return Err(spec.rule_error(format!("field {name:?} must be listed only once")));
            }
            key_fields.push(name);
        }
        Ok(Self { spec, key_fields })
    }

    pub fn create(spec: CheckSpec) -> Result<Box<dyn Check>> {
        Ok(Box::new(Self::new(spec)?))
    }

    pub fn key_fields(&self) -> &[String] {
        &self.key_fields
    }
}

impl Check for IsUniqueCheck {
    fn spec(&self) -> &CheckSpec {
        &self.spec
    }

    fn start(&self) -> Box<dyn CheckPass + '_> {
        Box::new(UniquePass {
            check: self,
            seen: HashMap::new(),
        })
    }
}

struct UniquePass<'c> {
    check: &'c IsUniqueCheck,
    /// Key to the number of the row it first occurred in.
    seen: HashMap<Vec<String>, usize>,
}

impl CheckPass for UniquePass<'_> {
    fn check_row(&mut self, row_number: usize, values: &RowValues) -> Result<()> {
        let key: Vec<String> = self
            .check
            .key_fields
            .iter()
            .map(|name| values.get(name).map(icd_model::Value::key).unwrap_or_default())
            .collect();
        if let Some(first) = self.seen.get(&key) {
            let shown: Vec<String> = self
                .check
                .key_fields
                .iter()
                .map(|name| {
                    let value = values.get(name).map(ToString::to_string).unwrap_or_default();
                    format!("{name}={value:?}")
                })
                .collect();
            return Err(IcdError::check(format!(
                "key {} must be unique but has already occurred in row {first}",
                shown.join(", ")
            )));
        }
        self.seen.insert(key, row_number);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icd_model::{ErrorKind, Value};

    fn row(branch: i64, id: i64) -> RowValues {
        [
            ("branch".to_string(), Value::Integer(branch)),
            ("id".to_string(), Value::Integer(id)),
        ]
        .into()
    }

    fn check(rule: &str) -> Result<IsUniqueCheck> {
        IsUniqueCheck::new(CheckSpec::new(
            "unique key",
            "IsUnique",
            rule,
            vec!["branch".to_string(), "id".to_string()],
        ))
    }

    #[test]
    fn compound_keys() {
        let check = check("branch, id").unwrap();
        let mut pass = check.start();
        pass.check_row(1, &row(1, 1)).unwrap();
        pass.check_row(2, &row(2, 1)).unwrap();
        let error = pass.check_row(3, &row(1, 1)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::CheckError);
        assert!(error.message().contains("row 1"), "{error}");
    }

    #[test]
    fn rejects_broken_rules() {
        assert_eq!(check("").unwrap_err().kind(), ErrorKind::CheckSyntax);
        assert_eq!(check("id, id").unwrap_err().kind(), ErrorKind::CheckSyntax);
        assert_eq!(check("id,,branch").unwrap_err().kind(), ErrorKind::CheckSyntax);
    }
}
