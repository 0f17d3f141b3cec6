//! Building an [`InterfaceControlDocument`] from ICD definition rows.

use std::collections::HashMap;

use icd_ingest::Row;
use icd_model::{
    DataFormat, DataFormatKind, IcdError, Location, Range, Result, is_format_key,
};
use tracing::debug;

use crate::checks::{Check, CheckRegistry, CheckSpec};
use crate::document::InterfaceControlDocument;
use crate::fields::{FieldFormat, FieldFormatRegistry, FieldSpec};

/// Marker in the third item of a field row for fields that may be empty.
pub const EMPTY_INDICATOR: &str = "x";

const MAX_DATA_FORMAT_ITEMS: usize = 2;
const MAX_FIELD_ITEMS: usize = 5;
const MAX_CHECK_ITEMS: usize = 3;

/// Field and check types available while reading an ICD.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistries {
    pub fields: FieldFormatRegistry,
    pub checks: CheckRegistry,
}

impl TypeRegistries {
    pub fn with_builtins() -> Self {
        Self {
            fields: FieldFormatRegistry::with_builtins(),
            checks: CheckRegistry::with_builtins(),
        }
    }
}

/// Meaning of an ICD row, taken from its first item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Comment,
    DataFormat,
    FieldFormat,
    Check,
}

impl RowKind {
    /// Fails with `CidSyntax` for anything but empty, `d`, `f` or `c`.
    pub fn classify(row: &Row) -> Result<Self> {
        let marker = row.cells.first().map(|cell| cell.trim()).unwrap_or_default();
        match marker.to_lowercase().as_str() {
            "" => Ok(Self::Comment),
            "d" => Ok(Self::DataFormat),
            "f" => Ok(Self::FieldFormat),
            "c" => Ok(Self::Check),
            _ => Err(IcdError::cid_syntax(format!(
                "first item in row is {marker:?} but must be empty or one of: c, d, f"
            ))
            .at(&row.location)),
        }
    }
}

/// How far an ICD has been declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Empty,
    HasDataFormat,
    /// At least one field is declared; the document can be built.
    Ready,
}

/// Collects data format, fields and checks row by row.
///
/// The data format must be complete before the first field is declared,
/// since field types such as `Decimal` depend on its properties.
#[derive(Debug)]
pub struct IcdBuilder<'r> {
    registries: &'r TypeRegistries,
    data_format: Option<DataFormat>,
    data_format_location: Option<Location>,
    fields: Vec<Box<dyn FieldFormat>>,
    field_locations: HashMap<String, Location>,
    checks: Vec<Box<dyn Check>>,
    check_locations: HashMap<String, Location>,
}

impl<'r> IcdBuilder<'r> {
    pub fn new(registries: &'r TypeRegistries) -> Self {
        Self {
            registries,
            data_format: None,
            data_format_location: None,
            fields: Vec::new(),
            field_locations: HashMap::new(),
            checks: Vec::new(),
            check_locations: HashMap::new(),
        }
    }

    pub fn state(&self) -> DocumentState {
        match (&self.data_format, self.fields.is_empty()) {
            (None, _) => DocumentState::Empty,
            (Some(_), true) => DocumentState::HasDataFormat,
            (Some(_), false) => DocumentState::Ready,
        }
    }

    /// Classify `row` and add what it declares.
    pub fn add_row(&mut self, row: &Row) -> Result<()> {
        let kind = RowKind::classify(row)?;
        debug!(location = %row.location, kind = ?kind, "icd row");
        match kind {
            RowKind::Comment => Ok(()),
            RowKind::DataFormat => self.add_data_format(row),
            RowKind::FieldFormat => self.add_field_format(row),
            RowKind::Check => self.add_check(row),
        }
    }

    /// Add a `d, <key>, <value>` row.
    pub fn add_data_format(&mut self, row: &Row) -> Result<()> {
        let items = items(row, MAX_DATA_FORMAT_ITEMS, IcdError::data_format_syntax)?;
        // A value made of blanks, such as a space as item delimiter, still counts.
        let value = row.cells.get(2).filter(|value| !value.is_empty());
        let (Some(key), Some(value)) = (items.first(), value) else {
            return Err(IcdError::data_format_syntax(format!(
                "data format row must contain a key and a value but has {} item(s)",
                items.len()
            ))
            .at(&row.location));
        };
        let key = key.trim();
        let key_location = row.cell_location(1);
        let value_location = row.cell_location(2);
        if is_format_key(key) {
            if let Some(previous) = &self.data_format {
                return Err(IcdError::data_format_syntax(format!(
                    "data format must be declared only once but is declared again as {value:?}"
                ))
                .at(&value_location)
                .see_also(
                    format!("first declared as {:?}", previous.kind().name()),
                    self.data_format_location.as_ref(),
                ));
            }
            let data_format = DataFormat::from_name(value.trim())
                .map_err(|error| error.at(&value_location))?;
            debug!(format = %data_format.kind().name(), "data format declared");
            self.data_format = Some(data_format);
            self.data_format_location = Some(value_location);
            return Ok(());
        }
        if let Some(first_field) = self.fields.first() {
            return Err(IcdError::data_format_syntax(format!(
                "data format property {key:?} must be set before the first field"
            ))
            .at(&key_location)
            .see_also(
                format!("first field {:?}", first_field.name()),
                self.field_locations.get(first_field.name()),
            ));
        }
        let Some(data_format) = self.data_format.as_mut() else {
            return Err(IcdError::data_format_syntax(format!(
                "data format must be declared with 'd, format, <name>' before property {key:?}"
            ))
            .at(&key_location));
        };
        data_format
            .set(key, value, Some(&key_location))
            .map_err(|error| error.or_at(&value_location))?;
        debug!(property = key, "data format property set");
        Ok(())
    }

    /// Add a `f, <name>, <type>[, <empty>][, <length>][, <rule>]` row.
    pub fn add_field_format(&mut self, row: &Row) -> Result<()> {
        let items = items(row, MAX_FIELD_ITEMS, IcdError::field_syntax)?;
        if items.len() < 2 {
            return Err(IcdError::field_syntax(format!(
                "field row must contain at least a name and a type but has {} item(s)",
                items.len()
            ))
            .at(&row.location));
        }
        let Some(data_format) = &self.data_format else {
            return Err(IcdError::data_format_syntax(
                "data format must be declared with 'd, format, <name>' before the first field",
            )
            .at(&row.location));
        };
        let item = |index: usize| items.get(index).map_or("", |text| text.trim());
        let name = item(0);
        let name_location = row.cell_location(1);
        if name.is_empty() {
            return Err(IcdError::field_syntax("field name must not be empty").at(&name_location));
        }
        if let Some(first) = self.field_locations.get(name) {
            return Err(IcdError::field_syntax(format!(
                "field name {name:?} must be used only once"
            ))
            .at(&name_location)
            .see_also("first declaration", Some(first)));
        }
        let allow_empty = match item(2).to_lowercase().as_str() {
            "" => false,
            marker if marker == EMPTY_INDICATOR => true,
            _ => {
                return Err(IcdError::field_syntax(format!(
                    "mark for empty field must be {EMPTY_INDICATOR:?} or empty but is {:?}",
                    item(2)
                ))
                .at(&row.cell_location(3)));
            }
        };
        let length_location = row.cell_location(4);
        let length = Range::parse(&format!("length of field {name:?}"), item(3))
            .map_err(|error| error.at(&length_location))?;
        if let Some(length) = &length {
            check_length(name, length, data_format.kind())
                .map_err(|error| error.at(&length_location))?;
        } else if data_format.kind() == DataFormatKind::Fixed {
            return Err(IcdError::field_syntax(format!(
                "length of field {name:?} must be declared for fixed format"
            ))
            .at(&length_location));
        }
        let spec = FieldSpec {
            name: name.to_string(),
            allow_empty,
            length,
            type_name: item(1).to_string(),
            rule: item(4).to_string(),
            location: Some(name_location.clone()),
        };
        let factory = self
            .registries
            .fields
            .factory(&spec.type_name)
            .map_err(|error| error.at(&row.cell_location(2)))?;
        let field = factory(spec, data_format).map_err(|error| error.or_at(&row.cell_location(5)))?;
        debug!(field = %name, field_type = %field.spec().type_name, "field declared");
        self.field_locations.insert(name.to_string(), name_location);
        self.fields.push(field);
        Ok(())
    }

    /// Add a `c, <description>, <type>[, <rule>]` row.
    pub fn add_check(&mut self, row: &Row) -> Result<()> {
        let items = items(row, MAX_CHECK_ITEMS, IcdError::check_syntax)?;
        if items.len() < 2 {
            return Err(IcdError::check_syntax(format!(
                "check row must contain at least a description and a type but has {} item(s)",
                items.len()
            ))
            .at(&row.location));
        }
        let item = |index: usize| items.get(index).map_or("", |text| text.trim());
        let description = item(0);
        let description_location = row.cell_location(1);
        if description.is_empty() {
            return Err(IcdError::check_syntax("check description must not be empty")
                .at(&description_location));
        }
        if let Some(first) = self.check_locations.get(description) {
            return Err(IcdError::check_syntax(format!(
                "check description {description:?} must be used only once"
            ))
            .at(&description_location)
            .see_also("first declaration", Some(first)));
        }
        let spec = CheckSpec {
            description: description.to_string(),
            type_name: item(1).to_string(),
            rule: item(2).to_string(),
            field_names: self.fields.iter().map(|field| field.name().to_string()).collect(),
            location: Some(description_location.clone()),
        };
        let factory = self
            .registries
            .checks
            .factory(&spec.type_name)
            .map_err(|error| error.at(&row.cell_location(2)))?;
        let check = factory(spec).map_err(|error| error.or_at(&row.cell_location(3)))?;
        debug!(check = %description, check_type = %check.spec().type_name, "check declared");
        self.check_locations.insert(description.to_string(), description_location);
        self.checks.push(check);
        Ok(())
    }

    /// Finish the document; it needs a data format and at least one field.
    pub fn build(self) -> Result<InterfaceControlDocument> {
        let Some(data_format) = self.data_format else {
            return Err(IcdError::data_format_syntax(
                "data format must be declared with 'd, format, <name>'",
            ));
        };
        if self.fields.is_empty() {
            return Err(IcdError::field_syntax("at least one field must be declared"));
        }
        Ok(InterfaceControlDocument::new(data_format, self.fields, self.checks))
    }
}

/// Items of `row` after the row kind, without trailing empty items.
fn items(row: &Row, max: usize, error: fn(String) -> IcdError) -> Result<&[String]> {
    let cells = row.cells.get(1..).unwrap_or_default();
    let used = cells
        .iter()
        .rposition(|cell| !cell.trim().is_empty())
        .map_or(0, |index| index + 1);
    if used > max {
        return Err(error(format!(
            "row must contain at most {max} items after the row kind but has {used}"
        ))
        .at(&row.cell_location(max + 1)));
    }
    Ok(&cells[..used])
}

fn check_length(name: &str, length: &Range, kind: DataFormatKind) -> Result<()> {
    if length.lower_limit().is_some_and(|lower| lower < 0) {
        return Err(IcdError::field_syntax(format!(
            "length of field {name:?} must not be negative: {length}"
        )));
    }
    if kind == DataFormatKind::Fixed && !length.exact_value().is_some_and(|exact| exact > 0) {
        return Err(IcdError::field_syntax(format!(
            "length of field {name:?} must be a single positive number for fixed format \
             but is {length}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use icd_model::ErrorKind;

    fn row(line: usize, cells: &[&str]) -> Row {
        let mut location = Location::new("icd.csv").with_cell();
        if line > 0 {
            location.advance_line(line);
        }
        Row::new(cells.iter().map(ToString::to_string).collect(), location)
    }

    #[test]
    fn classifies_rows() {
        assert_eq!(RowKind::classify(&row(0, &[" "])).unwrap(), RowKind::Comment);
        assert_eq!(RowKind::classify(&row(0, &[])).unwrap(), RowKind::Comment);
        assert_eq!(RowKind::classify(&row(0, &["D"])).unwrap(), RowKind::DataFormat);
        let error = RowKind::classify(&row(3, &["x", "age"])).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::CidSyntax);
        assert_eq!(error.location().map(Location::line), Some(3));
    }

    #[test]
    fn tracks_state() {
        let registries = TypeRegistries::with_builtins();
        let mut builder = IcdBuilder::new(&registries);
        assert_eq!(builder.state(), DocumentState::Empty);
        builder.add_row(&row(0, &["d", "format", "csv"])).unwrap();
        assert_eq!(builder.state(), DocumentState::HasDataFormat);
        builder.add_row(&row(1, &["f", "id", "Integer"])).unwrap();
        assert_eq!(builder.state(), DocumentState::Ready);
    }

    #[test]
    fn trailing_empty_items_are_ignored() {
        let registries = TypeRegistries::with_builtins();
        let mut builder = IcdBuilder::new(&registries);
        builder.add_row(&row(0, &["d", "format", "csv", "", ""])).unwrap();
        let error = builder
            .add_row(&row(1, &["f", "id", "Integer", "", "", "", "surplus"]))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FieldSyntax);
        assert_eq!(error.location().map(Location::cell), Some(6));
    }

    #[test]
    fn blank_data_format_values_are_kept() {
        let registries = TypeRegistries::with_builtins();
        let mut builder = IcdBuilder::new(&registries);
        builder.add_row(&row(0, &["d", "format", "csv"])).unwrap();
        builder.add_row(&row(1, &["d", "item delimiter", " "])).unwrap();
        builder.add_row(&row(2, &["d", "thousands separator", " ", ""])).unwrap();
        builder.add_row(&row(3, &["f", "amount", "Decimal"])).unwrap();
        let icd = builder.build().unwrap();
        assert_eq!(icd.data_format().item_delimiter(), ' ');
        assert_eq!(icd.data_format().thousands_separator(), Some(' '));

        let mut builder = IcdBuilder::new(&registries);
        builder.add_row(&row(0, &["d", "format", "csv"])).unwrap();
        let error = builder.add_row(&row(1, &["d", "item delimiter", ""])).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DataFormatSyntax);
        assert!(error.message().contains("key and a value"), "{error}");
    }

    #[test]
    fn padded_data_format_values_are_trimmed() {
        let text = "d, format, delimited\n\
                    d, item delimiter, ;\n\
                    d, quote character, '\n\
                    f, price, Decimal\n";
        let rows = icd_ingest::icd_rows_from_str("icd.csv", text).unwrap();
        let registries = TypeRegistries::with_builtins();
        let mut builder = IcdBuilder::new(&registries);
        for row in rows {
            builder.add_row(&row.unwrap()).unwrap();
        }
        let icd = builder.build().unwrap();
        assert_eq!(icd.data_format().item_delimiter(), ';');
        assert_eq!(icd.data_format().quote_character(), '\'');
    }

    #[test]
    fn properties_must_precede_fields() {
        let registries = TypeRegistries::with_builtins();
        let mut builder = IcdBuilder::new(&registries);
        builder.add_row(&row(0, &["d", "format", "csv"])).unwrap();
        builder.add_row(&row(1, &["f", "price", "Decimal"])).unwrap();
        let error = builder
            .add_row(&row(2, &["d", "decimal separator", ","]))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DataFormatSyntax);
        assert_eq!(error.see_also_location().map(Location::line), Some(1));
    }

    #[test]
    fn field_errors_point_at_the_item() {
        let registries = TypeRegistries::with_builtins();
        let mut builder = IcdBuilder::new(&registries);
        builder.add_row(&row(0, &["d", "format", "csv"])).unwrap();
        let error = builder.add_row(&row(1, &["f", "id", "Colour"])).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FieldLookup);
        assert_eq!(error.location().map(Location::cell), Some(2));

        let error = builder
            .add_row(&row(2, &["f", "id", "Integer", "", "", "1...x"]))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RangeSyntax);
        assert_eq!(error.location().map(Location::cell), Some(5));

        let error = builder.add_row(&row(3, &["f", "id", "Integer", "y"])).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FieldSyntax);
        assert_eq!(error.location().map(Location::cell), Some(3));
    }
}
