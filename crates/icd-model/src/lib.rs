//! Interface control document (ICD) model.
//!
//! This crate holds the building blocks shared by ICD readers and the
//! validation engine:
//!
//! - **Location**: line/column/cell/sheet positions used by every diagnostic
//! - **Errors**: [`IcdError`] with kind, location and see-also reference
//! - **Ranges**: the `lower...upper` grammar used for lengths and limits
//! - **Data formats**: the declared format kind and its properties
//! - **Values**: typed cell values produced by field formats

pub mod data_format;
pub mod error;
pub mod location;
pub mod range;
pub mod value;

pub use data_format::{
    DataFormat, DataFormatKind, DataFormatProperty, FORMAT_KEY, LineDelimiter, is_format_key,
};
pub use error::{ErrorKind, ErrorScope, IcdError, Result};
pub use location::Location;
pub use range::{NAME_TO_ASCII_CODE, Range, RangeItem, ascii_code_for_name};
pub use value::{RowValues, Value};
