//! Field formats: per-cell validation of raw text into typed values.
//!
//! Every field declared in an ICD is backed by a [`FieldFormat`] built by a
//! factory looked up in the [`FieldFormatRegistry`]. The registry created by
//! [`FieldFormatRegistry::with_builtins`] knows these types:
//!
//! | Type       | Rule                                   | Value        |
//! |------------|----------------------------------------|--------------|
//! | `Text`     | ignored                                | text         |
//! | `Integer`  | optional range, e.g. `0...150`         | integer      |
//! | `Decimal`  | empty                                  | decimal      |
//! | `DateTime` | human format, default `YYYY-MM-DD`     | date or time |
//! | `Choice`   | comma separated choices                | text         |
//! | `Pattern`  | glob with `*` and `?`                  | text         |
//! | `RegEx`    | regular expression matching the value  | text         |
//! | `Constant` | the only accepted value                | text         |

mod choice;
mod constant;
mod datetime;
mod decimal;
mod integer;
mod pattern;
mod text;

use std::fmt;

use icd_model::{DataFormat, ErrorKind, IcdError, Location, Range, Result, Value};

use crate::registry::TypeRegistry;

pub use choice::ChoiceFieldFormat;
pub use constant::ConstantFieldFormat;
pub use datetime::DateTimeFieldFormat;
pub use decimal::DecimalFieldFormat;
pub use integer::IntegerFieldFormat;
pub use pattern::{PatternFieldFormat, RegExFieldFormat};
pub use text::TextFieldFormat;

/// Declaration of a field as written in the ICD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub allow_empty: bool,
    /// Allowed number of characters.
    pub length: Option<Range>,
    pub type_name: String,
    pub rule: String,
    /// Where the field is declared.
    pub location: Option<Location>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allow_empty: false,
            length: None,
            type_name: type_name.into(),
            rule: String::new(),
            location: None,
        }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }

    #[must_use]
    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: Option<Range>) -> Self {
        self.length = length;
        self
    }

    /// Exact length if the length range is a single value.
    pub fn exact_length(&self) -> Option<usize> {
        self.length
            .as_ref()
            .and_then(Range::exact_value)
            .and_then(|length| usize::try_from(length).ok())
    }

    /// Rule error of this field; `FieldSyntax` unless the kind says otherwise.
    pub(crate) fn rule_error(&self, message: impl fmt::Display) -> IcdError {
        IcdError::field_syntax(format!(
            "rule for field {:?} of type {}: {message}",
            self.name, self.type_name
        ))
    }
}

/// Validation of the raw text of one field.
///
/// Implementations only provide [`FieldFormat::validate`]; the empty and
/// length checks come with the trait and run first.
pub trait FieldFormat: fmt::Debug + Send + Sync {
    fn spec(&self) -> &FieldSpec;

    /// Turn non empty `raw` text into a typed value.
    ///
    /// Fails with `FieldValue` if the text does not match the field's type
    /// and rule.
    fn validate(&self, raw: &str) -> Result<Value>;

    fn name(&self) -> &str {
        &self.spec().name
    }

    fn validate_empty(&self, raw: &str) -> Result<()> {
        if raw.is_empty() && !self.spec().allow_empty {
            return Err(IcdError::field_value("value must not be empty"));
        }
        Ok(())
    }

    fn validate_length(&self, raw: &str) -> Result<()> {
        match &self.spec().length {
            Some(length) => {
                let actual = i64::try_from(raw.chars().count()).unwrap_or(i64::MAX);
                length
                    .validate("length", actual)
                    .map_err(|error| error.reclassify(ErrorKind::FieldValue))
            }
            None => Ok(()),
        }
    }

    /// Full validation of a cell.
    ///
    /// An empty value of a field that allows empty values is accepted as
    /// [`Value::Empty`] without consulting length or rule.
    fn validated(&self, raw: &str) -> Result<Value> {
        self.validate_empty(raw)?;
        if raw.is_empty() {
            return Ok(Value::Empty);
        }
        self.validate_length(raw)?;
        self.validate(raw)
    }
}

/// Builds a field format from its declaration and the document's data format.
pub type FieldFormatFactory = fn(FieldSpec, &DataFormat) -> Result<Box<dyn FieldFormat>>;

/// Namespace field types are registered in unless qualified.
pub const FIELDS_NAMESPACE: &str = "fields";

/// Field types by name.
#[derive(Debug, Clone)]
pub struct FieldFormatRegistry {
    types: TypeRegistry<FieldFormatFactory>,
}

impl Default for FieldFormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldFormatRegistry {
    /// Create a registry without any types.
    pub fn new() -> Self {
        Self {
            types: TypeRegistry::new("field", FIELDS_NAMESPACE, ErrorKind::FieldLookup),
        }
    }

    /// Create a registry with the built-in field types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("Text", TextFieldFormat::create);
        registry.register("Integer", IntegerFieldFormat::create);
        registry.register("Decimal", DecimalFieldFormat::create);
        registry.register("DateTime", DateTimeFieldFormat::create);
        registry.register("Choice", ChoiceFieldFormat::create);
        registry.register("Pattern", PatternFieldFormat::create);
        registry.register("RegEx", RegExFieldFormat::create);
        registry.register("Constant", ConstantFieldFormat::create);
        registry
    }

    pub fn register(
        &mut self,
        name: &str,
        factory: FieldFormatFactory,
    ) -> Option<FieldFormatFactory> {
        self.types.register(name, factory)
    }

    pub fn register_in(
        &mut self,
        namespace: &str,
        name: &str,
        factory: FieldFormatFactory,
    ) -> Option<FieldFormatFactory> {
        self.types.register_in(namespace, name, factory)
    }

    /// Factory for `type_name`; fails with `FieldLookup` for unknown types.
    pub fn factory(&self, type_name: &str) -> Result<FieldFormatFactory> {
        self.types.resolve(type_name)
    }

    /// Build the field format for `spec`.
    pub fn create(
        &self,
        spec: FieldSpec,
        data_format: &DataFormat,
    ) -> Result<Box<dyn FieldFormat>> {
        let factory = self.factory(&spec.type_name)?;
        factory(spec, data_format)
    }

    pub fn type_names(&self) -> Vec<String> {
        self.types.display_names()
    }
}
