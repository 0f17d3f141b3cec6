//! Rows and the row source contract.

use icd_model::{Location, Result};

/// One record of cells, either from an ICD definition or from data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
    /// Location of the first cell.
    pub location: Location,
}

impl Row {
    pub fn new(cells: Vec<String>, location: Location) -> Self {
        Self { cells, location }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Location of cell `index` in this row.
    pub fn cell_location(&self, index: usize) -> Location {
        self.location.at_cell(index)
    }
}

/// Lazy, finite sequence of rows.
///
/// A source yields `Err` when the underlying input cannot be decoded or
/// parsed; consumers must stop reading after the first error.
pub trait RowSource: Iterator<Item = Result<Row>> {}

impl<T> RowSource for T where T: Iterator<Item = Result<Row>> {}

/// Row source over rows already held in memory, numbered from line 1.
pub fn rows_from_cells<I, R, S>(source_id: &str, rows: I) -> impl RowSource
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = S>,
    S: Into<String>,
{
    let base = Location::new(source_id).with_cell();
    rows.into_iter().enumerate().map(move |(index, cells)| {
        let mut location = base.clone();
        if index > 0 {
            location.advance_line(index);
        }
        Ok(Row::new(cells.into_iter().map(Into::into).collect(), location))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_rows_are_numbered() {
        let rows: Vec<Row> = rows_from_cells("mem", [vec!["a", "b"], vec!["c"]])
            .collect::<Result<_>>()
            .expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].location.line(), 1);
        assert_eq!(rows[1].cell_location(1).to_string(), "mem (R2C2)");
    }
}
