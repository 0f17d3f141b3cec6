use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use icd_validate::InterfaceControlDocument;

use crate::types::{FileOutcome, ValidationRun};

pub fn print_summary(run: &ValidationRun, max_rejected: usize) {
    println!("ICD: {}", run.icd.display());
    println!("{}", summary_table(run));
    for file in &run.files {
        if let Some(table) = rejected_table(file, max_rejected) {
            println!();
            println!("Rejected rows in {}:", file.path.display());
            println!("{table}");
            let listed = file.report.rejected.len().min(max_rejected);
            if file.report.rejected.len() > listed {
                println!("... and {} more", file.report.rejected.len() - listed);
            }
        }
        for reason in &file.report.end_check_failures {
            eprintln!("- {}: {reason}", file.path.display());
        }
        if let Some(reason) = &file.summary.data_format_failure {
            eprintln!("- {}: {reason}", file.path.display());
        }
    }
}

/// One row per data file plus a total row.
pub fn summary_table(run: &ValidationRun) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Accepted"),
        header_cell("Rejected"),
        header_cell("Check failures"),
        header_cell("End checks failed"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 5, CellAlignment::Center);
    let mut total_accepted = 0usize;
    let mut total_rejected = 0usize;
    for file in &run.files {
        let summary = &file.summary;
        total_accepted += summary.accepted;
        total_rejected += summary.rejected;
        table.add_row(vec![
            Cell::new(file.path.display()),
            Cell::new(summary.accepted),
            count_cell(summary.rejected, Color::Red),
            count_cell(summary.row_check_failures, Color::Yellow),
            count_cell(summary.end_check_failures, Color::Yellow),
            status_cell(file),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_accepted).add_attribute(Attribute::Bold),
        count_cell(total_rejected, Color::Red).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    table
}

/// The first `max_rows` rejected rows of `file`, if any.
pub fn rejected_table(file: &FileOutcome, max_rows: usize) -> Option<Table> {
    if file.report.rejected.is_empty() || max_rows == 0 {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Location"), header_cell("Reason")]);
    apply_table_style(&mut table);
    for row in file.report.rejected.iter().take(max_rows) {
        table.add_row(vec![
            Cell::new(row.location.to_string()).fg(Color::Blue),
            Cell::new(row.reason.as_deref().unwrap_or("-")),
        ]);
    }
    Some(table)
}

pub fn print_description(icd: &InterfaceControlDocument) {
    println!("Data format:");
    println!("{}", data_format_table(icd));
    println!("Fields:");
    println!("{}", fields_table(icd));
    if !icd.checks().is_empty() {
        println!("Checks:");
        println!("{}", checks_table(icd));
    }
}

pub fn data_format_table(icd: &InterfaceControlDocument) -> Table {
    let data_format = icd.data_format();
    let mut table = Table::new();
    table.set_header(vec![header_cell("Property"), header_cell("Value")]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new("format"),
        Cell::new(data_format.kind().name()).add_attribute(Attribute::Bold),
    ]);
    for (property, value) in data_format.properties() {
        table.add_row(vec![Cell::new(property.key()), Cell::new(format!("{value:?}"))]);
    }
    table
}

pub fn fields_table(icd: &InterfaceControlDocument) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Empty"),
        header_cell("Length"),
        header_cell("Rule"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for (index, field) in icd.field_formats().iter().enumerate() {
        let spec = field.spec();
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(&spec.name).fg(Color::Blue).add_attribute(Attribute::Bold),
            Cell::new(&spec.type_name),
            if spec.allow_empty {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("-")
            },
            spec.length
                .as_ref()
                .map_or_else(|| dim_cell("-"), |length| Cell::new(length.to_string())),
            text_or_dash(&spec.rule),
        ]);
    }
    table
}

pub fn checks_table(icd: &InterfaceControlDocument) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Check"), header_cell("Type"), header_cell("Rule")]);
    apply_table_style(&mut table);
    for check in icd.checks() {
        let spec = check.spec();
        table.add_row(vec![
            Cell::new(&spec.description).add_attribute(Attribute::Bold),
            Cell::new(&spec.type_name),
            text_or_dash(&spec.rule),
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(file: &FileOutcome) -> Cell {
    if file.summary.data_format_failure.is_some() {
        Cell::new("UNREADABLE")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else if file.summary.is_valid() {
        Cell::new("OK").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        Cell::new("FAILED").fg(Color::Red)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn text_or_dash(text: &str) -> Cell {
    if text.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(text)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
