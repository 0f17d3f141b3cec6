use std::collections::HashSet;
use std::fmt;

use icd_model::{IcdError, Result, RowValues};

use super::{Check, CheckPass, CheckSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Less,
    LessOrEqual,
    Equal,
    NotEqual,
    GreaterOrEqual,
    Greater,
}

impl ComparisonOperator {
    /// Two character operators first so `<=` is not read as `<`.
    const SYMBOLS: [(&'static str, Self); 6] = [
        ("<=", Self::LessOrEqual),
        (">=", Self::GreaterOrEqual),
        ("==", Self::Equal),
        ("!=", Self::NotEqual),
        ("<", Self::Less),
        (">", Self::Greater),
    ];

    pub fn symbol(self) -> &'static str {
        Self::SYMBOLS
            .iter()
            .find(|(_, operator)| *operator == self)
            .map_or("?", |(symbol, _)| symbol)
    }

    pub fn holds(self, left: usize, right: usize) -> bool {
        match self {
            Self::Less => left < right,
            Self::LessOrEqual => left <= right,
            Self::Equal => left == right,
            Self::NotEqual => left != right,
            Self::GreaterOrEqual => left >= right,
            Self::Greater => left > right,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The number of distinct values of a field compared against a limit.
#[derive(Debug, Clone)]
pub struct DistinctCountCheck {
    spec: CheckSpec,
    field_name: String,
    operator: ComparisonOperator,
    limit: usize,
}

impl DistinctCountCheck {
    pub fn new(spec: CheckSpec) -> Result<Self> {
        let rule = spec.rule.trim();
        let (index, symbol, operator) = ComparisonOperator::SYMBOLS
            .iter()
            .filter_map(|(symbol, operator)| {
                rule.find(symbol).map(|index| (index, *symbol, *operator))
            })
            .min_by_key(|(index, symbol, _)| (*index, std::cmp::Reverse(symbol.len())))
            .ok_or_else(|| {
                spec.rule_error(format!(
                    "rule must have the form '<field> <operator> <limit>' but is {rule:?}"
                ))
            })?;
        let field_text = &rule[..index];
        let limit_text = rule[index + symbol.len()..].trim();
        if field_text.trim().is_empty() {
            return Err(spec.rule_error("field name before operator must not be empty"));
        }
        let field_name = spec.field(field_text)?;
        let limit = limit_text.parse().map_err(|_| {
            spec.rule_error(format!(
                "limit must be a non negative integer but is {limit_text:?}"
            ))
        })?;
        Ok(Self {
            spec,
            field_name,
            operator,
            limit,
        })
    }

    pub fn create(spec: CheckSpec) -> Result<Box<dyn Check>> {
        Ok(Box::new(Self::new(spec)?))
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Check for DistinctCountCheck {
    fn spec(&self) -> &CheckSpec {
        &self.spec
    }

    fn start(&self) -> Box<dyn CheckPass + '_> {
        Box::new(DistinctCountPass {
            check: self,
            distinct: HashSet::new(),
        })
    }
}

struct DistinctCountPass<'c> {
    check: &'c DistinctCountCheck,
    distinct: HashSet<String>,
}

impl CheckPass for DistinctCountPass<'_> {
    fn check_row(&mut self, _row_number: usize, values: &RowValues) -> Result<()> {
        if let Some(value) = values.get(&self.check.field_name) {
            self.distinct.insert(value.key());
        }
        Ok(())
    }

    fn check_at_end(&mut self) -> Result<()> {
        let count = self.distinct.len();
        let check = self.check;
        if check.operator.holds(count, check.limit) {
            Ok(())
        } else {
            Err(IcdError::check(format!(
                "distinct count of {:?} is {count} but must be {} {}",
                check.field_name, check.operator, check.limit
            )))
        }
    }
}
