//! Registries resolving ICD type names to factories.
//!
//! Types are registered explicitly, usually once at startup. A type name in
//! an ICD is either plain (`Integer`) and resolved in the registry's default
//! namespace, or qualified (`custom.Integer`). Lookups ignore case.

use std::collections::BTreeMap;

use icd_model::{ErrorKind, IcdError, Result};

#[derive(Debug, Clone)]
struct Entry<F> {
    qualified_name: String,
    factory: F,
}

/// Mapping from qualified type name to factory.
#[derive(Debug, Clone)]
pub struct TypeRegistry<F> {
    what: &'static str,
    default_namespace: &'static str,
    lookup_error: ErrorKind,
    entries: BTreeMap<String, Entry<F>>,
}

impl<F: Copy> TypeRegistry<F> {
    /// Create an empty registry.
    ///
    /// `what` names the registered things in error messages, `lookup_error`
    /// is the kind of error raised for unknown names.
    pub fn new(
        what: &'static str,
        default_namespace: &'static str,
        lookup_error: ErrorKind,
    ) -> Self {
        Self {
            what,
            default_namespace,
            lookup_error,
            entries: BTreeMap::new(),
        }
    }

    /// Register `factory` as `name` in the default namespace.
    pub fn register(&mut self, name: &str, factory: F) -> Option<F> {
        self.register_in(self.default_namespace, name, factory)
    }

    /// Register `factory` as `namespace.name`; returns the factory it replaces.
    ///
    /// # Panics
    ///
    /// Panics if `namespace` or `name` is empty or contains a `.`.
    pub fn register_in(&mut self, namespace: &str, name: &str, factory: F) -> Option<F> {
        assert!(
            is_name_part(namespace) && is_name_part(name),
            "type must be registered as <namespace>.<name> but is {namespace:?}.{name:?}"
        );
        let qualified_name = format!("{namespace}.{name}");
        self.entries
            .insert(
                qualified_name.to_lowercase(),
                Entry {
                    qualified_name,
                    factory,
                },
            )
            .map(|entry| entry.factory)
    }

    /// Factory registered for `type_name`.
    pub fn resolve(&self, type_name: &str) -> Result<F> {
        let type_name = type_name.trim();
        let qualified_name = match type_name.rsplit_once('.') {
            Some((namespace, name)) => {
                if !is_name_part(namespace) || !is_name_part(name) {
                    return Err(IcdError::new(
                        self.lookup_error,
                        format!(
                            "{} type must be <name> or <namespace>.<name> but is {type_name:?}",
                            self.what
                        ),
                    ));
                }
                type_name.to_string()
            }
            None => format!("{}.{type_name}", self.default_namespace),
        };
        self.entries
            .get(&qualified_name.to_lowercase())
            .map(|entry| entry.factory)
            .ok_or_else(|| {
                IcdError::new(
                    self.lookup_error,
                    format!(
                        "cannot find {} type {type_name:?}; available types: {}",
                        self.what,
                        self.display_names().join(", ")
                    ),
                )
            })
    }

    /// Registered names; types of the default namespace without prefix.
    pub fn display_names(&self) -> Vec<String> {
        let prefix = format!("{}.", self.default_namespace);
        self.entries
            .values()
            .map(|entry| {
                entry
                    .qualified_name
                    .strip_prefix(&prefix)
                    .unwrap_or(&entry.qualified_name)
                    .to_string()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_name_part(text: &str) -> bool {
    !text.is_empty() && !text.contains('.') && !text.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry<u8> {
        let mut registry = TypeRegistry::new("field", "fields", ErrorKind::FieldLookup);
        registry.register("Integer", 1);
        registry.register_in("custom", "Integer", 2);
        registry
    }

    #[test]
    fn resolves_plain_and_qualified_names() {
        let registry = registry();
        assert_eq!(registry.resolve("integer").unwrap(), 1);
        assert_eq!(registry.resolve("Fields.Integer").unwrap(), 1);
        assert_eq!(registry.resolve("custom.INTEGER").unwrap(), 2);
    }

    #[test]
    fn unknown_names_fail_with_lookup_kind() {
        let registry = registry();
        for name in ["Decimal", "other.Integer", ".Integer", "fields.", "a..b"] {
            let error = registry.resolve(name).expect_err(name);
            assert_eq!(error.kind(), ErrorKind::FieldLookup, "{name}");
        }
    }

    #[test]
    fn register_replaces_previous() {
        let mut registry = registry();
        assert_eq!(registry.register("integer", 7), Some(1));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.display_names(), vec!["custom.Integer", "integer"]);
    }
}
