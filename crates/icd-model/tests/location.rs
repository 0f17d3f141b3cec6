//! Property tests for location bookkeeping.

use icd_model::Location;
use proptest::prelude::*;

fn tracked_location() -> Location {
    Location::new("data.txt").with_column().with_cell()
}

proptest! {
    #[test]
    fn advance_line_rewinds_column_and_cell(
        columns in 1usize..500,
        cells in 1usize..50,
        lines in 1usize..50,
    ) {
        let mut location = tracked_location();
        location.advance_column(columns);
        location.advance_cell(cells);
        let line_before = location.line();
        location.advance_line(lines);
        prop_assert_eq!(location.column(), 0);
        prop_assert_eq!(location.cell(), 0);
        prop_assert_eq!(location.line(), line_before + lines);
    }

    #[test]
    fn later_lines_sort_after_earlier_ones(first in 1usize..1000, gap in 1usize..1000) {
        let mut earlier = tracked_location();
        earlier.advance_line(first);
        let mut later = earlier.clone();
        later.advance_line(gap);
        prop_assert!(earlier < later);
        prop_assert_ne!(earlier, later);
    }

    #[test]
    fn rendering_is_one_based(lines in 1usize..1000, cell in 0usize..100) {
        let mut location = Location::new("dir/data.csv").with_cell();
        location.advance_line(lines);
        location.set_cell(cell);
        prop_assert_eq!(location.to_string(), format!("data.csv (R{}C{})", lines + 1, cell + 1));
    }
}
