//! Row sources for interface control documents.
//!
//! Both the ICD definition and the data it describes are read as a lazy
//! sequence of [`Row`]s. This crate provides:
//!
//! - **Row contract**: [`Row`] and [`RowSource`]
//! - **Decoding**: byte input to text using the declared encoding, chunk by chunk
//! - **Delimited data**: CSV like input via the `csv` crate
//! - **Fixed width data**: cells cut by declared field lengths
//! - **ICD files**: delimited input with a sniffed item delimiter
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use icd_ingest::{open_data_rows, read_icd_rows};
//!
//! let icd_rows = read_icd_rows(Path::new("customers_icd.csv"))?;
//! let data_rows = open_data_rows(Path::new("customers.csv"), &data_format, &[])?;
//! ```

mod decode;
mod delimited;
mod fixed;
mod icd;
mod row;
mod source;

pub use decode::{DecodingReader, ZIP_SIGNATURE, decode, read_bytes};
pub use delimited::{DelimitedOptions, DelimitedRows, delimited_rows_from_str};
pub use fixed::FixedRows;
pub use icd::{CANDIDATE_DELIMITERS, icd_rows_from_str, read_icd_rows, sniff_item_delimiter};
pub use row::{Row, RowSource, rows_from_cells};
pub use source::{DataRows, data_rows, open_data_rows};
