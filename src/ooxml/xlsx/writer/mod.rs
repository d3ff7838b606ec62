//! Streaming writer components for XLSX.
//!
//! Parts are staged on disk while rows arrive and zipped together at close:
//!
//! - [`stream`]: position-tracking part output with in-place patching
//! - [`strings`]: the shared string table
//! - [`styles`]: style registration and `styles.xml`
//! - [`sheet`]: worksheet part emission
//! - [`workbook`]: sheet bookkeeping and the staging directory
//! - [`package`]: final ZIP assembly
//! - [`lifecycle`]: the public [`XlsxWriter`]

pub mod lifecycle;
pub mod package;
pub mod sheet;
pub mod stream;
pub mod strings;
pub mod styles;
pub mod workbook;

pub use lifecycle::XlsxWriter;
pub use package::{PackageWriter, write_package};
pub use sheet::{Worksheet, WorksheetManager, XlsxWorksheetManager};
pub use strings::SharedStringsWriter;
pub use styles::{StyleManager, StyleRegistry};
pub use workbook::WorkbookManager;

#[cfg(test)]
mod tests;
