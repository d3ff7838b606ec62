//! Longan - A streaming writer for Microsoft Excel (.xlsx) workbooks
//!
//! Rows are written to disk as soon as they are added, so documents with
//! millions of rows can be produced with a small, constant memory footprint.
//!
//! # Features
//!
//! - **Streaming rows**: Each row is serialized immediately into a staged worksheet part
//! - **Style deduplication**: Identical styles share one registered style id
//! - **Shared strings**: Optional document-wide string table with deduplication
//! - **Automatic sheets**: A new sheet is started when the row limit is reached
//! - **Sheet settings**: Names, visibility, views, column widths and merged cells
//! - **Clean failure**: A failed write removes every file the writer created
//!
//! # Example - Writing a workbook
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use longan::XlsxWriter;
//! use longan::sheet::{Cell, CellValue, Row, Style};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = XlsxWriter::new();
//! writer.set_should_use_inline_strings(false)?;
//! writer.open_to_file("sales.xlsx")?;
//! writer.set_sheet_name("Sales")?;
//!
//! let header = Style::new().with_bold(true).with_background_color("FFDDEBF7");
//! writer.add_row(&Row::from_values(["Region", "Units", "Shipped"]).with_style(header))?;
//!
//! let shipped = NaiveDate::from_ymd_opt(2024, 3, 1).ok_or("bad date")?;
//! writer.add_row(&Row::from_values([
//!     CellValue::from("North"),
//!     CellValue::from(1250),
//!     CellValue::from(shipped),
//! ]))?;
//! writer.add_row(&Row::new().with_cell(1, Cell::new("=SUM(B2:B2)")))?;
//!
//! writer.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Writing into memory
//!
//! ```
//! use std::io::Cursor;
//! use longan::XlsxWriter;
//! use longan::sheet::Row;
//!
//! let mut writer = XlsxWriter::new();
//! writer.open_to_stream(Cursor::new(Vec::new()))?;
//! writer.add_rows((1..=10).map(|n| Row::from_values([n])))?;
//! let bytes = writer.into_inner()?.into_inner();
//! assert_eq!(&bytes[..2], b"PK");
//! # Ok::<(), longan::Error>(())
//! ```

/// Common types and utilities shared by all writer components
pub mod common;

/// OOXML (Office Open XML) package writing
///
/// This module provides the XLSX streaming writer and the package-level
/// vocabulary it needs.
pub mod ooxml;

/// Rows, cells and styles handed to the writer
pub mod sheet;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use ooxml::xlsx::{SheetView, WriterOptions, XlsxWriter};
pub use sheet::{Cell, CellType, CellValue, Row, Style};
