//! Checks: rules spanning several rows.
//!
//! A [`Check`] is the immutable declaration; every validation pass asks it
//! for a fresh [`CheckPass`] holding the state accumulated while rows go by.
//! Built-in types:
//!
//! - `IsUnique`: rule lists the key fields, e.g. `customer_id` or `branch, id`
//! - `DistinctCount`: rule like `branch_id < 10`
//! - `RowCount`: rule is a range of accepted rows, e.g. `1...1000`

mod distinct_count;
mod row_count;
mod unique;

use std::fmt;

use icd_model::{ErrorKind, IcdError, Location, Result, RowValues};

use crate::registry::TypeRegistry;

pub use distinct_count::{ComparisonOperator, DistinctCountCheck};
pub use row_count::RowCountCheck;
pub use unique::IsUniqueCheck;

/// Declaration of a check as written in the ICD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSpec {
    /// Unique, human readable name of the check.
    pub description: String,
    pub type_name: String,
    pub rule: String,
    /// Fields declared in the ICD, in declaration order.
    pub field_names: Vec<String>,
    pub location: Option<Location>,
}

impl CheckSpec {
    pub fn new(
        description: impl Into<String>,
        type_name: impl Into<String>,
        rule: impl Into<String>,
        field_names: Vec<String>,
    ) -> Self {
        Self {
            description: description.into(),
            type_name: type_name.into(),
            rule: rule.into(),
            field_names,
            location: None,
        }
    }

    /// `name` if it is a declared field, `FieldLookup` otherwise.
    pub fn field(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if self.field_names.iter().any(|field_name| field_name == name) {
            Ok(name.to_string())
        } else {
            Err(IcdError::field_lookup(format!(
                "check {:?} refers to unknown field {name:?}; declared fields: {}",
                self.description,
                self.field_names.join(", ")
            )))
        }
    }

    pub(crate) fn rule_error(&self, message: impl fmt::Display) -> IcdError {
        IcdError::check_syntax(format!(
            "rule for check {:?} of type {}: {message}",
            self.description, self.type_name
        ))
    }
}

/// Declared check, shared by all validation passes.
pub trait Check: fmt::Debug + Send + Sync {
    fn spec(&self) -> &CheckSpec;

    /// Fresh state for one validation pass.
    fn start(&self) -> Box<dyn CheckPass + '_>;

    fn description(&self) -> &str {
        &self.spec().description
    }
}

/// State of a check during one validation pass.
pub trait CheckPass {
    /// Inspect a row whose fields all validated; fails with `Check` if the
    /// row violates the check.
    fn check_row(&mut self, row_number: usize, values: &RowValues) -> Result<()>;

    /// Called once after the last row.
    fn check_at_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Builds a check from its declaration.
pub type CheckFactory = fn(CheckSpec) -> Result<Box<dyn Check>>;

/// Namespace check types are registered in unless qualified.
pub const CHECKS_NAMESPACE: &str = "checks";

/// Check types by name.
#[derive(Debug, Clone)]
pub struct CheckRegistry {
    types: TypeRegistry<CheckFactory>,
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self {
            types: TypeRegistry::new("check", CHECKS_NAMESPACE, ErrorKind::CheckSyntax),
        }
    }

    /// Create a registry with the built-in check types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("IsUnique", IsUniqueCheck::create);
        registry.register("DistinctCount", DistinctCountCheck::create);
        registry.register("RowCount", RowCountCheck::create);
        registry
    }

    pub fn register(&mut self, name: &str, factory: CheckFactory) -> Option<CheckFactory> {
        self.types.register(name, factory)
    }

    pub fn register_in(
        &mut self,
        namespace: &str,
        name: &str,
        factory: CheckFactory,
    ) -> Option<CheckFactory> {
        self.types.register_in(namespace, name, factory)
    }

    /// Factory for `type_name`; fails with `CheckSyntax` for unknown types.
    pub fn factory(&self, type_name: &str) -> Result<CheckFactory> {
        self.types.resolve(type_name)
    }

    pub fn create(&self, spec: CheckSpec) -> Result<Box<dyn Check>> {
        let factory = self.factory(&spec.type_name)?;
        factory(spec)
    }

    pub fn type_names(&self) -> Vec<String> {
        self.types.display_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<String> {
        vec!["id".to_string(), "name".to_string()]
    }

    #[test]
    fn unknown_check_type_is_a_syntax_error() {
        let error = CheckRegistry::with_builtins()
            .create(CheckSpec::new("x", "IsPrime", "id", fields()))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::CheckSyntax);
    }

    #[test]
    fn unknown_field_is_a_lookup_error() {
        let error = CheckRegistry::with_builtins()
            .create(CheckSpec::new("unique id", "IsUnique", "id, nope", fields()))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FieldLookup);
        assert!(error.message().contains("nope"), "{error}");
    }

    #[test]
    fn passes_start_fresh() {
        let check = CheckRegistry::with_builtins()
            .create(CheckSpec::new("unique id", "IsUnique", "id", fields()))
            .unwrap();
        let values: RowValues = [("id".to_string(), icd_model::Value::Integer(1))].into();
        let mut first = check.start();
        first.check_row(1, &values).unwrap();
        assert!(first.check_row(2, &values).is_err());
        let mut second = check.start();
        second.check_row(1, &values).unwrap();
    }
}
