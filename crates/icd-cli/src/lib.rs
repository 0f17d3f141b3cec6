//! Command line front end for ICD validation.
//!
//! The `icd` binary parses arguments and installs logging; this library
//! holds what it runs so it can be tested without a process.

pub mod commands;
pub mod logging;
pub mod progress;
pub mod summary;
pub mod types;
