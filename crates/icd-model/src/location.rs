//! Positions inside an input source.
//!
//! A [`Location`] always tracks a line. Column, cell and sheet tracking are
//! opt-in and chosen by the reader that produces the location:
//!
//! - text and fixed-width readers track columns (characters in a line),
//! - delimited readers track cells,
//! - spreadsheet readers track cells and sheets.
//!
//! Reading a dimension that is not tracked is a programming error and panics.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Source id used when the input has no path, for example an in-memory buffer.
pub const UNNAMED_SOURCE: &str = "<io>";

/// Position in an input source; all counters are 0-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    source_id: String,
    line: usize,
    column: usize,
    cell: usize,
    sheet: usize,
    has_column: bool,
    has_cell: bool,
    has_sheet: bool,
}

impl Location {
    /// Create a location at the first line of `source_id` tracking lines only.
    pub fn new(source_id: impl Into<String>) -> Self {
        let source_id = source_id.into();
        let source_id = if source_id.is_empty() {
            UNNAMED_SOURCE.to_string()
        } else {
            source_id
        };
        Self {
            source_id,
            line: 0,
            column: 0,
            cell: 0,
            sheet: 0,
            has_column: false,
            has_cell: false,
            has_sheet: false,
        }
    }

    #[must_use]
    pub fn with_column(mut self) -> Self {
        self.has_column = true;
        self
    }

    #[must_use]
    pub fn with_cell(mut self) -> Self {
        self.has_cell = true;
        self
    }

    #[must_use]
    pub fn with_sheet(mut self) -> Self {
        self.has_sheet = true;
        self
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn has_column(&self) -> bool {
        self.has_column
    }

    pub fn has_cell(&self) -> bool {
        self.has_cell
    }

    pub fn has_sheet(&self) -> bool {
        self.has_sheet
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Current character in the line or cell.
    ///
    /// # Panics
    ///
    /// Panics if columns are not tracked.
    pub fn column(&self) -> usize {
        assert!(self.has_column, "location {self} does not track columns");
        self.column
    }

    /// # Panics
    ///
    /// Panics if cells are not tracked.
    pub fn cell(&self) -> usize {
        assert!(self.has_cell, "location {self} does not track cells");
        self.cell
    }

    /// # Panics
    ///
    /// Panics if sheets are not tracked.
    pub fn sheet(&self) -> usize {
        assert!(self.has_sheet, "location {self} does not track sheets");
        self.sheet
    }

    pub fn advance_column(&mut self, amount: usize) {
        assert!(amount > 0, "column advance must be positive");
        assert!(self.has_column, "location {self} does not track columns");
        self.column += amount;
    }

    pub fn advance_cell(&mut self, amount: usize) {
        assert!(amount > 0, "cell advance must be positive");
        assert!(self.has_cell, "location {self} does not track cells");
        self.cell += amount;
    }

    pub fn set_cell(&mut self, cell: usize) {
        assert!(self.has_cell, "location {self} does not track cells");
        self.cell = cell;
    }

    /// Move `amount` lines forward and rewind column and cell.
    pub fn advance_line(&mut self, amount: usize) {
        assert!(amount > 0, "line advance must be positive");
        self.line += amount;
        self.column = 0;
        self.cell = 0;
    }

    /// Move to the start of the next sheet.
    pub fn advance_sheet(&mut self) {
        assert!(self.has_sheet, "location {self} does not track sheets");
        self.sheet += 1;
        self.line = 0;
        self.column = 0;
        self.cell = 0;
    }

    /// Copy of this location pointing at cell `cell` of the same line, or an
    /// unchanged copy when cells are not tracked.
    pub fn at_cell(&self, cell: usize) -> Self {
        let mut result = self.clone();
        if result.has_cell {
            result.cell = cell;
        }
        result
    }

    fn base_name(&self) -> &str {
        Path::new(&self.source_id)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.source_id)
    }

    /// Comparison key; untracked dimensions are `None` so locations with
    /// different tracking never compare equal.
    fn sort_key(&self) -> (&str, Option<usize>, usize, Option<usize>, Option<usize>) {
        (
            &self.source_id,
            self.has_sheet.then_some(self.sheet),
            self.line,
            self.has_cell.then_some(self.cell),
            self.has_column.then_some(self.column),
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.base_name())?;
        if self.has_cell {
            if self.has_sheet {
                write!(f, "Sheet{}!", self.sheet + 1)?;
            }
            write!(f, "R{}C{}", self.line + 1, self.cell + 1)?;
        } else {
            write!(f, "{}", self.line + 1)?;
        }
        if self.has_column {
            write!(f, ";{}", self.column + 1)?;
        }
        write!(f, ")")
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for Location {}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_common_layouts() {
        assert_eq!(Location::new("data.txt").with_column().to_string(), "data.txt (1;1)");
        assert_eq!(Location::new("data.csv").with_cell().to_string(), "data.csv (R1C1)");
        assert_eq!(
            Location::new("data.ods").with_cell().with_sheet().to_string(),
            "data.ods (Sheet1!R1C1)"
        );
        assert_eq!(
            Location::new("data.ods")
                .with_column()
                .with_cell()
                .with_sheet()
                .to_string(),
            "data.ods (Sheet1!R1C1;1)"
        );
        assert_eq!(Location::new("").to_string(), "<io> (1)");
    }

    #[test]
    fn renders_base_name_only() {
        let mut location = Location::new("/tmp/input/customers.csv").with_cell();
        location.advance_line(2);
        location.advance_cell(3);
        assert_eq!(location.to_string(), "customers.csv (R3C4)");
    }

    #[test]
    fn sheet_prefix_requires_cells() {
        let location = Location::new("book.xls").with_sheet();
        assert_eq!(location.to_string(), "book.xls (1)");
    }

    #[test]
    fn advance_sheet_rewinds_everything() {
        let mut location = Location::new("book.ods").with_cell().with_sheet();
        location.advance_line(4);
        location.advance_cell(2);
        location.advance_sheet();
        assert_eq!(location.sheet(), 1);
        assert_eq!(location.line(), 0);
        assert_eq!(location.cell(), 0);
    }

    #[test]
    #[should_panic(expected = "does not track columns")]
    fn column_requires_tracking() {
        let location = Location::new("data.csv").with_cell();
        let _ = location.column();
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn zero_advance_is_rejected() {
        let mut location = Location::new("data.txt");
        location.advance_line(0);
    }

    #[test]
    fn ordering_uses_tracked_dimensions() {
        let mut first = Location::new("a.csv").with_cell();
        let mut second = first.clone();
        second.advance_cell(1);
        assert!(first < second);
        first.advance_line(1);
        assert!(second < first);
        assert_ne!(Location::new("a.csv"), Location::new("a.csv").with_cell());
    }

    #[test]
    fn at_cell_leaves_original_untouched() {
        let location = Location::new("data.csv").with_cell();
        let moved = location.at_cell(3);
        assert_eq!(moved.cell(), 3);
        assert_eq!(location.cell(), 0);
    }
}
