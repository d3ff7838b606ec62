//! Row, cell and style value model consumed by the writer.
//!
//! # Quick Start
//!
//! ```rust
//! use longan::sheet::{Cell, Row, Style};
//!
//! let mut row = Row::from_values(["Item", "Qty"]).with_style(Style::new().with_bold(true));
//! row.set_cell(3, Cell::new("=SUM(B2:B9)"));
//! row.set_outline_level(1)?;
//! assert_eq!(row.cell_count(), 4);
//! # Ok::<(), longan::Error>(())
//! ```

// Submodule declarations
pub mod cell;
pub mod row;
pub mod style;
pub mod types;

// Re-exports
pub use cell::Cell;
pub use row::{MAX_OUTLINE_LEVEL, Row};
pub use style::{
    Border, BorderLineStyle, BorderSide, Font, HorizontalAlignment, Style, VerticalAlignment,
};
pub use types::{CellType, CellValue};
