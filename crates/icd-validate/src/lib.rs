//! Validation engine for interface control documents (ICDs).
//!
//! An ICD declares the data format of a tabular input, one field format per
//! column and any number of checks across rows. This crate turns ICD rows
//! into an [`InterfaceControlDocument`] and streams data rows through it:
//!
//! - **Fields**: [`FieldFormat`] implementations and their registry
//! - **Checks**: [`Check`] implementations with per-pass [`CheckPass`] state
//! - **Builder**: [`IcdBuilder`] classifying and collecting definition rows
//! - **Validation**: [`InterfaceControlDocument::validate`] reporting to
//!   [`ValidationListener`]s
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use icd_validate::{InterfaceControlDocument, ValidationReport};
//!
//! let icd = InterfaceControlDocument::from_path(Path::new("customers_icd.csv"))?;
//! let mut report = ValidationReport::new();
//! let summary = icd.validate_path(Path::new("customers.csv"), &mut [&mut report]);
//! assert!(summary.is_valid());
//! ```

pub mod builder;
pub mod checks;
pub mod document;
pub mod fields;
pub mod listener;
mod registry;

pub use builder::{DocumentState, EMPTY_INDICATOR, IcdBuilder, RowKind, TypeRegistries};
pub use checks::{Check, CheckFactory, CheckPass, CheckRegistry, CheckSpec};
pub use document::InterfaceControlDocument;
pub use fields::{FieldFormat, FieldFormatFactory, FieldFormatRegistry, FieldSpec};
pub use listener::{ReportedRow, ValidationListener, ValidationReport, ValidationSummary};
pub use registry::TypeRegistry;
