//! Excel (.xlsx) spreadsheet writing.
//!
//! Rows are streamed to disk as they are added, so memory use stays flat no
//! matter how many rows a document holds. Styles and strings are deduplicated
//! across the whole document.
//!
//! # Example
//!
//! ```rust,no_run
//! use longan::ooxml::xlsx::{SheetView, XlsxWriter};
//! use longan::sheet::{CellValue, Row};
//!
//! let mut view = SheetView::default();
//! view.freeze(1, 0);
//!
//! let mut writer = XlsxWriter::new();
//! writer.open_to_file("frozen.xlsx")?;
//! writer.set_sheet_view(view)?;
//! writer.set_column_width(24.0, [0, 1])?;
//! writer.add_row(&Row::from_values(["Name", "Score"]))?;
//! writer.add_row(&Row::from_values([CellValue::from("Ada"), CellValue::from(98.5)]))?;
//! writer.close()?;
//! # Ok::<(), longan::Error>(())
//! ```

pub mod format;
pub mod options;
pub mod views;
pub mod worksheet;
pub mod writer;

pub use format::{MAX_CELL_TEXT_LENGTH, MAX_COLUMNS, MAX_ROWS, cell_reference, column_to_letters};
pub use options::{ColumnWidth, MergeCell, WriterOptions};
pub use views::{FreezePanes, SheetView, SheetViewType};
pub use worksheet::{MAX_SHEET_NAME_LENGTH, Sheet, validate_sheet_name};
pub use writer::XlsxWriter;
