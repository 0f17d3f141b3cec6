//! Typed values produced by field formats.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Value of a single validated cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// Empty cell of a field that allows empty values.
    Empty,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Key usable for equality based bookkeeping such as uniqueness checks.
    ///
    /// Decimals use their bit pattern so `1.0` and `1.00` share a key.
    pub fn key(&self) -> String {
        match self {
            Self::Decimal(value) => format!("d:{:x}", value.to_bits()),
            other => format!("{}:{other}", other.type_tag()),
        }
    }

    fn type_tag(&self) -> &'static str {
        match self {
            Self::Empty => "e",
            Self::Text(_) => "t",
            Self::Integer(_) => "i",
            Self::Decimal(_) => "d",
            Self::Date(_) => "a",
            Self::DateTime(_) => "m",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            Self::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Validated values of one row keyed by field name.
pub type RowValues = BTreeMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_distinguish_types() {
        assert_ne!(Value::Integer(1).key(), Value::Text("1".to_string()).key());
        assert_eq!(Value::Decimal(1.0).key(), Value::Decimal(1.00).key());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_string(&Value::Integer(42)).expect("serialize value");
        assert_eq!(json, r#"{"type":"integer","value":42}"#);
    }
}
