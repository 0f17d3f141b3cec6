use icd_model::{ErrorKind, Range, Result, RowValues};

use super::{Check, CheckPass, CheckSpec};

/// The number of accepted rows must be within a range.
#[derive(Debug, Clone)]
pub struct RowCountCheck {
    spec: CheckSpec,
    range: Range,
}

impl RowCountCheck {
    pub fn new(spec: CheckSpec) -> Result<Self> {
        let range = Range::parse(&format!("rule for check {:?}", spec.description), &spec.rule)
            .map_err(|error| error.reclassify(ErrorKind::CheckSyntax))?
            .ok_or_else(|| spec.rule_error("rule must be a range of row counts"))?;
        Ok(Self { spec, range })
    }

    pub fn create(spec: CheckSpec) -> Result<Box<dyn Check>> {
        Ok(Box::new(Self::new(spec)?))
    }
}

impl Check for RowCountCheck {
    fn spec(&self) -> &CheckSpec {
        &self.spec
    }

    fn start(&self) -> Box<dyn CheckPass + '_> {
        Box::new(RowCountPass {
            range: &self.range,
            count: 0,
        })
    }
}

struct RowCountPass<'c> {
    range: &'c Range,
    count: i64,
}

impl CheckPass for RowCountPass<'_> {
    fn check_row(&mut self, _row_number: usize, _values: &RowValues) -> Result<()> {
        self.count += 1;
        Ok(())
    }

    fn check_at_end(&mut self) -> Result<()> {
        self.range
            .validate("row count", self.count)
            .map_err(|error| error.reclassify(ErrorKind::CheckError))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(rule: &str) -> Result<RowCountCheck> {
        RowCountCheck::new(CheckSpec::new("rows", "RowCount", rule, Vec::new()))
    }

    #[test]
    fn counts_rows_at_end() {
        let check = check("1...2").unwrap();
        let mut pass = check.start();
        pass.check_at_end().unwrap_err();

        let mut pass = check.start();
        pass.check_row(1, &RowValues::new()).unwrap();
        pass.check_at_end().unwrap();
    }

    #[test]
    fn rule_is_required() {
        assert_eq!(check("").unwrap_err().kind(), ErrorKind::CheckSyntax);
        assert_eq!(check("x...").unwrap_err().kind(), ErrorKind::CheckSyntax);
    }
}
